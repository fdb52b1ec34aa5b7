//! Bound syntax tree consumed by the code generator
//!
//! The frontend parses and resolves the surface program, then hands over a
//! [`Program`]: flat arenas of declarations addressed by stable indices, with
//! every expression node already carrying the symbol it resolves to.
//! The design prioritizes:
//! - Stable identity (arena indices, never node addresses)
//! - Closed grammar (every kind the engine sees is a variant here)
//! - A plain JSON wire shape (an out-of-process frontend writes it to a file)

use crate::semantic::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! decl_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

decl_id!(
    /// Index into [`Program::types`]
    TypeId,
    "type"
);
decl_id!(
    /// Index into [`Program::methods`]
    MethodId,
    "method"
);
decl_id!(
    /// Index into [`Program::constructors`]
    CtorId,
    "constructor"
);
decl_id!(
    /// Index into [`Program::properties`]
    PropertyId,
    "property"
);

/// The full bound declaration set, in source-appearance order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub constructors: Vec<CtorDecl>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a program produced by the frontend
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn add_type(&mut self, decl: TypeDecl) -> TypeId {
        self.types.push(decl);
        TypeId(self.types.len() as u32 - 1)
    }

    pub fn add_method(&mut self, decl: MethodDecl) -> MethodId {
        self.methods.push(decl);
        MethodId(self.methods.len() as u32 - 1)
    }

    pub fn add_constructor(&mut self, decl: CtorDecl) -> CtorId {
        self.constructors.push(decl);
        CtorId(self.constructors.len() as u32 - 1)
    }

    pub fn add_property(&mut self, decl: PropertyDecl) -> PropertyId {
        self.properties.push(decl);
        PropertyId(self.properties.len() as u32 - 1)
    }
}

/// Surface declaration kinds that can name a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
    Enum,
}

/// A class, struct or enum declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    /// Attribute names exactly as written (`C` for `[C]`)
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

impl TypeDecl {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            attributes: Vec::new(),
            is_static: false,
            fields: Vec::new(),
        }
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Struct,
            ..Self::class(name)
        }
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Enum,
            ..Self::class(name)
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn with_field(mut self, type_text: impl Into<String>, name: impl Into<String>) -> Self {
        self.fields.push(FieldDecl {
            type_text: type_text.into(),
            name: name.into(),
        });
        self
    }

    pub fn static_type(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// A field; `type_text` is the declared type as written in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub type_text: String,
    pub name: String,
}

/// A method or function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub type_text: String,
    pub name: String,
}

impl Param {
    pub fn new(type_text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_text: type_text.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Absent for a top-level entry point
    #[serde(default)]
    pub owner: Option<TypeId>,
    pub name: String,
    /// `extern`: bound to an existing native function, never given a body
    #[serde(default)]
    pub is_native: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default = "void_type_text")]
    pub return_type: String,
    #[serde(default)]
    pub body: Option<Vec<Stmt>>,
}

fn void_type_text() -> String {
    "void".to_string()
}

impl MethodDecl {
    /// An instance method with an empty body
    pub fn instance(owner: TypeId, name: impl Into<String>) -> Self {
        Self {
            owner: Some(owner),
            name: name.into(),
            is_native: false,
            is_static: false,
            params: Vec::new(),
            return_type: void_type_text(),
            body: Some(Vec::new()),
        }
    }

    /// A static `extern` binding to a native function
    pub fn native(owner: Option<TypeId>, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            is_native: true,
            is_static: true,
            params: Vec::new(),
            return_type: void_type_text(),
            body: None,
        }
    }

    pub fn with_param(mut self, type_text: impl Into<String>, name: impl Into<String>) -> Self {
        self.params.push(Param::new(type_text, name));
        self
    }

    pub fn returning(mut self, type_text: impl Into<String>) -> Self {
        self.return_type = type_text.into();
        self
    }

    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A user-declared constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtorDecl {
    pub owner: TypeId,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    #[serde(default)]
    pub owner: Option<TypeId>,
    pub name: String,
    #[serde(default)]
    pub is_native: bool,
}

/// A resolved reference to a type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A type declared in the program
    Declared { id: TypeId },
    /// A type known only by its metadata name (`Single`, `Int32`)
    External { name: String },
    /// A single-dimension array
    Array { element: Box<TypeRef> },
}

impl TypeRef {
    pub fn declared(id: TypeId) -> Self {
        TypeRef::Declared { id }
    }

    pub fn external(name: impl Into<String>) -> Self {
        TypeRef::External { name: name.into() }
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
        }
    }
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Expression {
        expr: Expr,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Block {
        statements: Vec<Stmt>,
    },
    /// `T name = init;` or `var name = init;` with the type already inferred
    LocalDecl {
        name: String,
        ty: TypeRef,
        #[serde(default)]
        initializer: Option<Expr>,
    },
    /// Any other statement form of the surface language
    Unsupported {
        syntax_kind: String,
    },
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expression { expr }
    }

    pub fn block(statements: Vec<Stmt>) -> Self {
        Stmt::Block { statements }
    }

    pub fn while_loop(condition: Expr, body: Stmt) -> Self {
        Stmt::While {
            condition,
            body: Box::new(body),
        }
    }

    pub fn local(name: impl Into<String>, ty: TypeRef, initializer: Expr) -> Self {
        Stmt::LocalDecl {
            name: name.into(),
            ty,
            initializer: Some(initializer),
        }
    }

    /// Syntax kind name, used in diagnostics
    pub fn kind_name(&self) -> &str {
        match self {
            Stmt::Expression { .. } => "ExpressionStatement",
            Stmt::While { .. } => "WhileStatement",
            Stmt::Block { .. } => "Block",
            Stmt::LocalDecl { .. } => "LocalDeclarationStatement",
            Stmt::Unsupported { syntax_kind } => syntax_kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    String,
    True,
    False,
    Numeric,
    Character,
    Null,
}

/// One element of a collection expression (`[a, b, ..rest]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionElement {
    Expression { expr: Expr },
    Spread { expr: Expr },
}

/// `member = value` inside an object initializer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInit {
    pub member: String,
    pub value: Expr,
}

/// Expression nodes, each carrying what the frontend resolved for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// `receiver.Method(args)` or `Method(args)`
    Invocation {
        #[serde(default)]
        receiver: Option<Box<Expr>>,
        method: MethodId,
        #[serde(default)]
        args: Vec<Expr>,
    },
    ElementAccess {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// `[a, b, c]`; `converted_type` is the type the literal converts to
    Collection {
        converted_type: TypeRef,
        elements: Vec<CollectionElement>,
    },
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    Identifier {
        name: String,
        symbol: Symbol,
    },
    /// `new() { A = 1 }` with the type inferred from context
    ImplicitObjectCreation {
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        initializers: Vec<MemberInit>,
    },
    /// `new T(args)`; `constructor` is the user constructor it binds to, if any
    ObjectCreation {
        ty: TypeId,
        #[serde(default)]
        constructor: Option<CtorId>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    MemberAccess {
        target: Box<Expr>,
        name: String,
        symbol: Symbol,
    },
    Literal {
        literal: LiteralKind,
        text: String,
    },
    PrefixUnary {
        op: String,
        operand: Box<Expr>,
    },
    /// Bare `{ a, b }`
    Initializer {
        elements: Vec<Expr>,
    },
    Assignment {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    /// Any other expression form of the surface language
    Unsupported {
        syntax_kind: String,
    },
}

impl Expr {
    pub fn local(name: impl Into<String>) -> Self {
        Expr::Identifier {
            name: name.into(),
            symbol: Symbol::Local,
        }
    }

    pub fn field(name: impl Into<String>, owner: TypeId) -> Self {
        Expr::Identifier {
            name: name.into(),
            symbol: Symbol::Field { owner: Some(owner) },
        }
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expr::Literal {
            literal: LiteralKind::Numeric,
            text: text.into(),
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Expr::Literal {
            literal: LiteralKind::String,
            text: text.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Literal {
            literal: if value { LiteralKind::True } else { LiteralKind::False },
            text: value.to_string(),
        }
    }

    pub fn binary(left: Expr, op: impl Into<String>, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
        }
    }

    pub fn assign(left: Expr, op: impl Into<String>, right: Expr) -> Self {
        Expr::Assignment {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
        }
    }

    pub fn call(method: MethodId, args: Vec<Expr>) -> Self {
        Expr::Invocation {
            receiver: None,
            method,
            args,
        }
    }

    pub fn method_call(receiver: Expr, method: MethodId, args: Vec<Expr>) -> Self {
        Expr::Invocation {
            receiver: Some(Box::new(receiver)),
            method,
            args,
        }
    }

    pub fn new_object(ty: TypeId, constructor: Option<CtorId>, args: Vec<Expr>) -> Self {
        Expr::ObjectCreation {
            ty,
            constructor,
            args,
        }
    }

    pub fn member(target: Expr, name: impl Into<String>, symbol: Symbol) -> Self {
        Expr::MemberAccess {
            target: Box::new(target),
            name: name.into(),
            symbol,
        }
    }

    /// Syntax kind name, used in diagnostics
    pub fn kind_name(&self) -> &str {
        match self {
            Expr::Invocation { .. } => "InvocationExpression",
            Expr::ElementAccess { .. } => "ElementAccessExpression",
            Expr::Collection { .. } => "CollectionExpression",
            Expr::Binary { .. } => "BinaryExpression",
            Expr::Identifier { .. } => "IdentifierName",
            Expr::ImplicitObjectCreation { .. } => "ImplicitObjectCreationExpression",
            Expr::ObjectCreation { .. } => "ObjectCreationExpression",
            Expr::MemberAccess { .. } => "MemberAccessExpression",
            Expr::Literal { .. } => "LiteralExpression",
            Expr::PrefixUnary { .. } => "PrefixUnaryExpression",
            Expr::Initializer { .. } => "InitializerExpression",
            Expr::Assignment { .. } => "AssignmentExpression",
            Expr::Unsupported { syntax_kind } => syntax_kind,
        }
    }
}
