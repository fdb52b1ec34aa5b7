//! Representation decisions
//!
//! A declared type carrying the marker attribute is lowered inline: a plain C
//! aggregate, passed by value and constructed as a compound literal. Every
//! other declared type lives on the heap behind a pointer and is constructed
//! through a function call. The decision is made once per type when the run
//! starts and read from the cache afterwards.

use super::{CodegenError, CodegenResult, NameTable};
use crate::ast::{TypeId, TypeRef};
use crate::semantic::{DeclRef, SymbolError, SymbolTable};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Inline aggregate, `T`
    Value,
    /// Heap allocation, `T*`
    Reference,
}

/// What lowering needs to know about a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeData {
    /// C spelling of the type
    pub name: String,
    pub is_primitive: bool,
    pub representation: Representation,
}

impl TypeData {
    pub fn is_value(&self) -> bool {
        self.representation == Representation::Value
    }
}

#[derive(Debug, Clone)]
pub struct RepresentationResolver {
    /// Indexed by `TypeId`
    representations: Vec<Representation>,
    /// Metadata name of an external type -> C primitive
    primitives: HashMap<&'static str, &'static str>,
}

impl RepresentationResolver {
    pub fn new(symbols: &SymbolTable<'_>, marker_attribute: &str) -> Self {
        let representations = symbols
            .types()
            .map(|(_, decl)| {
                if decl.has_attribute(marker_attribute) {
                    Representation::Value
                } else {
                    Representation::Reference
                }
            })
            .collect();

        let primitives = HashMap::from([
            ("Single", "float"),
            ("Int32", "int"),
            ("Double", "double"),
            ("Boolean", "int"),
        ]);

        Self {
            representations,
            primitives,
        }
    }

    /// Cached representation of a declared type
    pub fn representation(&self, id: TypeId) -> CodegenResult<Representation> {
        self.representations.get(id.index()).copied().ok_or_else(|| {
            CodegenError::from(SymbolError::MissingDeclaration {
                kind: "type",
                index: id.0,
            })
        })
    }

    pub fn is_value(&self, id: TypeId) -> bool {
        matches!(self.representation(id), Ok(Representation::Value))
    }

    /// Resolve a scalar type reference. Arrays have no scalar spelling; the
    /// callers that accept them resolve the element type instead.
    pub fn resolve(
        &self,
        symbols: &SymbolTable<'_>,
        names: &mut NameTable,
        ty: &TypeRef,
    ) -> CodegenResult<TypeData> {
        match ty {
            TypeRef::Declared { id } => Ok(TypeData {
                name: names.name_of(symbols, DeclRef::Type(*id))?,
                is_primitive: false,
                representation: self.representation(*id)?,
            }),
            TypeRef::External { name } => {
                let primitive = self
                    .primitives
                    .get(name.as_str())
                    .ok_or_else(|| SymbolError::UnknownPrimitive { name: name.clone() })?;
                Ok(TypeData {
                    name: primitive.to_string(),
                    is_primitive: true,
                    representation: Representation::Value,
                })
            }
            TypeRef::Array { .. } => Err(CodegenError::unsupported(
                "ArrayType",
                "array types only lower as locals and collection literals",
            )),
        }
    }
}
