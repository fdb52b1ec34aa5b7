//! Generated names
//!
//! Every type, method and constructor gets one C name per run, assigned the
//! first time it is asked for and reused for every later reference:
//!
//! | Declaration | Name |
//! |---|---|
//! | class / struct | `<Identifier>` |
//! | method | `<Owner>_<Method>_<n>` |
//! | constructor | `<Owner>_constructor_<n>` |
//! | synthesized default constructor | `<TypeName>_defaultConstructor_<n>` |
//!
//! `n` comes from a single counter shared by the three numbered forms, so the
//! numbering follows request order and never repeats within a run.

use super::{CodegenError, CodegenResult};
use crate::ast::{TypeId, TypeKind};
use crate::semantic::{DeclRef, SymbolError, SymbolTable};
use std::collections::HashMap;

/// Memoized generated names for one run
#[derive(Debug, Default)]
pub struct NameTable {
    names: HashMap<DeclRef, String>,
    default_constructors: HashMap<TypeId, String>,
    next_id: u32,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generated name of `decl`, allocating it on first request
    pub fn name_of(&mut self, symbols: &SymbolTable<'_>, decl: DeclRef) -> CodegenResult<String> {
        if let Some(existing) = self.names.get(&decl) {
            return Ok(existing.clone());
        }

        let name = self.allocate(symbols, decl)?;
        log::trace!("named {:?} -> {}", decl, name);
        self.names.insert(decl, name.clone());
        Ok(name)
    }

    /// Name of the synthesized default constructor of `ty`. Kept apart from
    /// the type's own name.
    pub fn default_constructor_name(
        &mut self,
        symbols: &SymbolTable<'_>,
        ty: TypeId,
    ) -> CodegenResult<String> {
        if let Some(existing) = self.default_constructors.get(&ty) {
            return Ok(existing.clone());
        }

        let type_name = self.name_of(symbols, DeclRef::Type(ty))?;
        let name = format!("{}_defaultConstructor_{}", type_name, self.unique_id());
        self.default_constructors.insert(ty, name.clone());
        Ok(name)
    }

    fn allocate(&mut self, symbols: &SymbolTable<'_>, decl: DeclRef) -> CodegenResult<String> {
        match decl {
            DeclRef::Type(id) => {
                let ty = symbols.ty(id)?;
                match ty.kind {
                    TypeKind::Class | TypeKind::Struct => Ok(ty.name.clone()),
                    TypeKind::Enum => Err(CodegenError::unsupported(
                        "EnumDeclaration",
                        format!("'{}' cannot be given a generated name", ty.name),
                    )),
                }
            }
            DeclRef::Method(id) => {
                let method = symbols.method(id)?;
                let owner = method.owner.ok_or_else(|| SymbolError::MissingOwner {
                    method: method.name.clone(),
                })?;
                let owner = &symbols.ty(owner)?.name;
                Ok(format!("{}_{}_{}", owner, method.name, self.unique_id()))
            }
            DeclRef::Constructor(id) => {
                let ctor = symbols.constructor(id)?;
                let owner = &symbols.ty(ctor.owner)?.name;
                Ok(format!("{}_constructor_{}", owner, self.unique_id()))
            }
        }
    }

    fn unique_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CtorDecl, CtorId, MethodDecl, MethodId, Program, TypeDecl};

    fn program() -> Program {
        let mut program = Program::new();
        let a = program.add_type(TypeDecl::class("A"));
        let b = program.add_type(TypeDecl::class("B"));
        program.add_type(TypeDecl::enumeration("Mode"));
        program.add_method(MethodDecl::instance(a, "Update"));
        program.add_method(MethodDecl::instance(b, "Update"));
        program.add_method(MethodDecl::instance(a, "Update").with_param("int", "x"));
        program.add_constructor(CtorDecl { owner: b, params: vec![], body: None });
        program
    }

    #[test]
    fn test_names_are_memoized() {
        let program = program();
        let symbols = SymbolTable::new(&program).unwrap();
        let mut names = NameTable::new();

        let first = names.name_of(&symbols, DeclRef::Method(MethodId(0))).unwrap();
        let second = names.name_of(&symbols, DeclRef::Method(MethodId(0))).unwrap();

        assert_eq!(first, "A_Update_0");
        assert_eq!(first, second);
    }

    #[test]
    fn test_same_names_never_collide() {
        let program = program();
        let symbols = SymbolTable::new(&program).unwrap();
        let mut names = NameTable::new();

        let generated: Vec<String> = [
            DeclRef::Method(MethodId(0)),
            DeclRef::Method(MethodId(1)),
            DeclRef::Method(MethodId(2)),
            DeclRef::Constructor(CtorId(0)),
        ]
        .into_iter()
        .map(|decl| names.name_of(&symbols, decl).unwrap())
        .collect();

        assert_eq!(
            generated,
            vec!["A_Update_0", "B_Update_1", "A_Update_2", "B_constructor_3"]
        );
    }

    #[test]
    fn test_type_names_do_not_consume_counter() {
        let program = program();
        let symbols = SymbolTable::new(&program).unwrap();
        let mut names = NameTable::new();

        assert_eq!(names.name_of(&symbols, DeclRef::Type(TypeId(1))).unwrap(), "B");
        assert_eq!(
            names.default_constructor_name(&symbols, TypeId(0)).unwrap(),
            "A_defaultConstructor_0"
        );
        assert_eq!(
            names.default_constructor_name(&symbols, TypeId(0)).unwrap(),
            "A_defaultConstructor_0"
        );
        // the type keeps its own name alongside the default constructor's
        assert_eq!(names.name_of(&symbols, DeclRef::Type(TypeId(0))).unwrap(), "A");
        assert_eq!(
            names.name_of(&symbols, DeclRef::Method(MethodId(1))).unwrap(),
            "B_Update_1"
        );
    }

    #[test]
    fn test_enum_cannot_be_named() {
        let program = program();
        let symbols = SymbolTable::new(&program).unwrap();
        let mut names = NameTable::new();

        let err = names.name_of(&symbols, DeclRef::Type(TypeId(2))).unwrap_err();
        assert_eq!(err.unsupported_kind(), Some("EnumDeclaration"));
    }

    #[test]
    fn test_ownerless_method_cannot_be_named() {
        let mut program = Program::new();
        program.add_method(MethodDecl::native(None, "Main"));
        let symbols = SymbolTable::new(&program).unwrap();
        let mut names = NameTable::new();

        let err = names.name_of(&symbols, DeclRef::Method(MethodId(0))).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::ResolutionInvariant(SymbolError::MissingOwner { .. })
        ));
    }
}
