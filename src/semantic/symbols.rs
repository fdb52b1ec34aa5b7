//! Resolved symbols and declaration lookup
//!
//! The frontend resolves every name before handing the tree over; this module
//! defines the vocabulary it resolves to and the table the code generator
//! uses to get from a stable declaration id back to its declaration.

use crate::ast::{
    CtorDecl, CtorId, MethodDecl, MethodId, Program, PropertyDecl, PropertyId, TypeDecl, TypeId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type for symbol operations
pub type SymbolResult<T> = Result<T, SymbolError>;

/// Inconsistencies between the frontend's resolution and what the code
/// generator relies on. None of these are user-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("{kind} #{index} is not declared in the program")]
    MissingDeclaration { kind: &'static str, index: u32 },

    #[error("field '{field}' of {owner} referenced unqualified while lowering {receiver}")]
    FieldOutsideReceiver {
        field: String,
        owner: String,
        receiver: String,
    },

    #[error("method '{method}' has no owning type")]
    MissingOwner { method: String },

    #[error("call to '{method}' has no receiver outside of a type")]
    MissingReceiver { method: String },

    #[error("method '{method}' has no body")]
    MissingBody { method: String },

    #[error("no primitive mapping for external type '{name}'")]
    UnknownPrimitive { name: String },
}

/// What a name in the bound tree resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symbol {
    /// A local variable or parameter
    Local,
    /// A field; `owner` is absent when the declaring type is external
    Field {
        #[serde(default)]
        owner: Option<TypeId>,
    },
    Property { property: PropertyId },
    EnumMember,
    /// A method group (the callee part of an invocation)
    Method { method: MethodId },
    Type,
}

/// A declaration that can be given a generated name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclRef {
    Type(TypeId),
    Method(MethodId),
    Constructor(CtorId),
}

/// Read-only lookup over a bound [`Program`]
#[derive(Debug, Clone)]
pub struct SymbolTable<'p> {
    program: &'p Program,
    /// User constructors per owning type, in source order
    constructors_by_owner: HashMap<TypeId, Vec<CtorId>>,
}

impl<'p> SymbolTable<'p> {
    /// Index the program, checking that every owner reference points at a
    /// declared type.
    pub fn new(program: &'p Program) -> SymbolResult<Self> {
        let mut table = Self {
            program,
            constructors_by_owner: HashMap::new(),
        };

        for (index, method) in program.methods.iter().enumerate() {
            if let Some(owner) = method.owner {
                table.ty(owner)?;
            }
            log::trace!("indexed method {} ({})", method.name, MethodId(index as u32));
        }

        for property in &program.properties {
            if let Some(owner) = property.owner {
                table.ty(owner)?;
            }
        }

        for (index, ctor) in program.constructors.iter().enumerate() {
            table.ty(ctor.owner)?;
            table
                .constructors_by_owner
                .entry(ctor.owner)
                .or_default()
                .push(CtorId(index as u32));
        }

        Ok(table)
    }

    pub fn ty(&self, id: TypeId) -> SymbolResult<&'p TypeDecl> {
        self.program
            .types
            .get(id.index())
            .ok_or(SymbolError::MissingDeclaration { kind: "type", index: id.0 })
    }

    pub fn method(&self, id: MethodId) -> SymbolResult<&'p MethodDecl> {
        self.program
            .methods
            .get(id.index())
            .ok_or(SymbolError::MissingDeclaration { kind: "method", index: id.0 })
    }

    pub fn constructor(&self, id: CtorId) -> SymbolResult<&'p CtorDecl> {
        self.program
            .constructors
            .get(id.index())
            .ok_or(SymbolError::MissingDeclaration { kind: "constructor", index: id.0 })
    }

    pub fn property(&self, id: PropertyId) -> SymbolResult<&'p PropertyDecl> {
        self.program
            .properties
            .get(id.index())
            .ok_or(SymbolError::MissingDeclaration { kind: "property", index: id.0 })
    }

    /// User-declared constructors of `ty`
    pub fn constructors_of(&self, ty: TypeId) -> &[CtorId] {
        self.constructors_by_owner
            .get(&ty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All declared types with their ids, in source order
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &'p TypeDecl)> {
        self.program
            .types
            .iter()
            .enumerate()
            .map(|(index, decl)| (TypeId(index as u32), decl))
    }

    /// All declared methods with their ids, in source order
    pub fn methods(&self) -> impl Iterator<Item = (MethodId, &'p MethodDecl)> {
        self.program
            .methods
            .iter()
            .enumerate()
            .map(|(index, decl)| (MethodId(index as u32), decl))
    }

    /// Source name of a type, for diagnostics
    pub fn type_name(&self, id: TypeId) -> String {
        self.ty(id)
            .map(|decl| decl.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_index_by_owner() {
        let mut program = Program::new();
        let a = program.add_type(TypeDecl::class("A"));
        let b = program.add_type(TypeDecl::class("B"));
        let first = program.add_constructor(CtorDecl { owner: b, params: vec![], body: None });
        let second = program.add_constructor(CtorDecl { owner: b, params: vec![], body: None });

        let table = SymbolTable::new(&program).unwrap();

        assert!(table.constructors_of(a).is_empty());
        assert_eq!(table.constructors_of(b), &[first, second]);
    }

    #[test]
    fn test_dangling_owner_is_rejected() {
        let mut program = Program::new();
        program.add_method(MethodDecl::instance(TypeId(3), "Update"));

        let err = SymbolTable::new(&program).unwrap_err();
        assert_eq!(err, SymbolError::MissingDeclaration { kind: "type", index: 3 });
    }

    #[test]
    fn test_lookup_out_of_range() {
        let program = Program::new();
        let table = SymbolTable::new(&program).unwrap();

        assert!(table.method(MethodId(0)).is_err());
        assert!(table.property(PropertyId(1)).is_err());
        assert_eq!(table.type_name(TypeId(7)), "type#7");
    }

    #[test]
    fn test_symbol_wire_shape() {
        let symbol: Symbol = serde_json::from_str(r#"{ "kind": "field" }"#).unwrap();
        assert_eq!(symbol, Symbol::Field { owner: None });

        let symbol: Symbol = serde_json::from_str(r#"{ "kind": "method", "method": 2 }"#).unwrap();
        assert_eq!(symbol, Symbol::Method { method: MethodId(2) });
    }
}
