//! Item Code Generation
//!
//! Declarations are lowered in three passes over the whole program: struct
//! definitions, then default constructors, then method bodies. Each pass
//! visits declarations in source order and finishes before the next starts.

use super::{
    statements::StatementGenerator, CCodeBuilder, CodegenContext, CodegenError, CodegenMetrics,
    CodegenResult,
};
use crate::ast::{MethodDecl, MethodId, Stmt, TypeDecl, TypeId, TypeKind};
use crate::semantic::{DeclRef, SymbolError};

/// Item generator handles code generation for top-level declarations
pub struct ItemGenerator<'a, 'p> {
    context: &'a mut CodegenContext<'p>,
    metrics: &'a mut CodegenMetrics,
}

impl<'a, 'p> ItemGenerator<'a, 'p> {
    pub fn new(context: &'a mut CodegenContext<'p>, metrics: &'a mut CodegenMetrics) -> Self {
        Self { context, metrics }
    }

    /// Pass 1: one struct definition per lowered type
    pub fn generate_types(&mut self, builder: &mut CCodeBuilder) -> CodegenResult<()> {
        let symbols = self.context.symbols.clone();
        for (id, decl) in symbols.types() {
            if !self.is_lowered_type(id, decl) {
                continue;
            }
            self.metrics.record_declaration();

            let name = self.context.names.name_of(&symbols, DeclRef::Type(id))?;
            log::debug!("emitting struct {}", name);

            builder.line(&format!("typedef struct {} {{", name));
            builder.indent_inc();
            for field in &decl.fields {
                builder.line(&format!("{} {};", field.type_text, field.name));
            }
            builder.indent_dec();
            builder.line(&format!("}} {};", name));
            builder.newline();
        }
        Ok(())
    }

    /// Pass 2: a heap allocator for every lowered, non-static type
    pub fn generate_constructors(&mut self, builder: &mut CCodeBuilder) -> CodegenResult<()> {
        let symbols = self.context.symbols.clone();
        for (id, decl) in symbols.types() {
            if !self.is_lowered_type(id, decl) || decl.is_static {
                continue;
            }
            self.metrics.record_declaration();

            if !symbols.constructors_of(id).is_empty() {
                return Err(CodegenError::unsupported(
                    "ConstructorDeclaration",
                    format!("user constructors on '{}' are not lowered", decl.name),
                ));
            }

            let type_name = self.context.names.name_of(&symbols, DeclRef::Type(id))?;
            let name = self.context.names.default_constructor_name(&symbols, id)?;
            log::debug!("emitting default constructor {}", name);

            builder.line(&format!("{}* {}()", type_name, name));
            builder.open_block();
            builder.line(&format!(
                "return ({}*)calloc(1, sizeof({}));",
                type_name, type_name
            ));
            builder.close_block();
            builder.newline();
        }
        Ok(())
    }

    /// Pass 3: method bodies, including the program entry point
    pub fn generate_methods(&mut self, builder: &mut CCodeBuilder) -> CodegenResult<()> {
        let symbols = self.context.symbols.clone();
        for (id, method) in symbols.methods() {
            self.metrics.record_declaration();

            if method.name == self.context.options.entry_point {
                log::debug!("emitting entry point {}", method.name);
                let body = self.body_of(method)?;
                builder.line("int main()");
                self.generate_body(body, None, builder)?;
                builder.newline();
            } else if method.is_native || method.is_static {
                log::trace!("skipping {} (native or static)", method.name);
            } else {
                self.generate_method(id, method, builder)?;
            }
        }
        Ok(())
    }

    fn generate_method(
        &mut self,
        id: MethodId,
        method: &MethodDecl,
        builder: &mut CCodeBuilder,
    ) -> CodegenResult<()> {
        let owner = method.owner.ok_or_else(|| SymbolError::MissingOwner {
            method: method.name.clone(),
        })?;
        let body = self.body_of(method)?;

        let context = &mut *self.context;
        let name = context.names.name_of(&context.symbols, DeclRef::Method(id))?;
        let owner_name = context.names.name_of(&context.symbols, DeclRef::Type(owner))?;
        log::debug!("emitting method {}", name);

        let mut params = vec![format!("{} *this", owner_name)];
        params.extend(
            method
                .params
                .iter()
                .map(|param| format!("{} {}", param.type_text, param.name)),
        );

        builder.line(&format!("{} {}({})", method.return_type, name, params.join(", ")));
        self.generate_body(body, Some(owner), builder)?;
        builder.newline();
        Ok(())
    }

    fn generate_body(
        &mut self,
        body: &[Stmt],
        receiver: Option<TypeId>,
        builder: &mut CCodeBuilder,
    ) -> CodegenResult<()> {
        StatementGenerator::new(self.context, receiver).generate_block(body, builder)
    }

    fn body_of<'m>(&self, method: &'m MethodDecl) -> CodegenResult<&'m [Stmt]> {
        method.body.as_deref().ok_or_else(|| {
            SymbolError::MissingBody {
                method: method.name.clone(),
            }
            .into()
        })
    }

    /// Struct-backed user types: not enums, not marked for the value
    /// representation, and not the marker attribute's own definition
    fn is_lowered_type(&self, id: TypeId, decl: &TypeDecl) -> bool {
        matches!(decl.kind, TypeKind::Class | TypeKind::Struct)
            && !self.context.repr.is_value(id)
            && decl.name != self.context.options.marker_definition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CtorDecl, Expr, Program};
    use crate::config::CodegenOptions;

    fn run<F>(program: &Program, pass: F) -> CodegenResult<String>
    where
        F: FnOnce(&mut ItemGenerator<'_, '_>, &mut CCodeBuilder) -> CodegenResult<()>,
    {
        let mut context = CodegenContext::new(program, CodegenOptions::default())?;
        let mut metrics = CodegenMetrics::new();
        let mut builder = CCodeBuilder::new();
        pass(&mut ItemGenerator::new(&mut context, &mut metrics), &mut builder)?;
        Ok(builder.finish())
    }

    #[test]
    fn test_struct_definitions() {
        let mut program = Program::new();
        program.add_type(
            TypeDecl::class("Alien")
                .with_field("Vector3", "position")
                .with_field("int", "hp"),
        );
        program.add_type(TypeDecl::structure("Vector3").with_attribute("C"));
        program.add_type(TypeDecl::class("CAttribute"));
        program.add_type(TypeDecl::enumeration("Mode"));

        let code = run(&program, |gen, b| gen.generate_types(b)).unwrap();
        assert_eq!(
            code,
            "typedef struct Alien {\n    Vector3 position;\n    int hp;\n} Alien;\n\n"
        );
    }

    #[test]
    fn test_default_constructors_skip_static_types() {
        let mut program = Program::new();
        program.add_type(TypeDecl::class("Game"));
        program.add_type(TypeDecl::class("Util").static_type());

        let code = run(&program, |gen, b| gen.generate_constructors(b)).unwrap();
        assert_eq!(
            code,
            concat!(
                "Game* Game_defaultConstructor_0()\n",
                "{\n    return (Game*)calloc(1, sizeof(Game));\n}\n\n"
            )
        );
    }

    #[test]
    fn test_user_constructor_is_rejected() {
        let mut program = Program::new();
        let game = program.add_type(TypeDecl::class("Game"));
        program.add_constructor(CtorDecl {
            owner: game,
            params: vec![],
            body: Some(vec![]),
        });

        let err = run(&program, |gen, b| gen.generate_constructors(b)).unwrap_err();
        assert_eq!(err.unsupported_kind(), Some("ConstructorDeclaration"));
    }

    #[test]
    fn test_method_signature_and_entry_point() {
        let mut program = Program::new();
        let game = program.add_type(TypeDecl::class("Game").with_field("int", "score"));
        program.add_method(MethodDecl::native(Some(game), "DrawText"));
        program.add_method(
            MethodDecl::instance(game, "Update")
                .with_param("float", "dt")
                .with_body(vec![Stmt::expr(Expr::assign(
                    Expr::field("score", game),
                    "+=",
                    Expr::number("1"),
                ))]),
        );
        program.add_method(MethodDecl::instance(game, "Main").static_method());

        let code = run(&program, |gen, b| gen.generate_methods(b)).unwrap();
        assert_eq!(
            code,
            concat!(
                "void Game_Update_0(Game *this, float dt)\n{\n    this->score += 1;\n}\n\n",
                "int main()\n{\n}\n\n"
            )
        );
    }

    #[test]
    fn test_entry_point_has_no_receiver() {
        let mut program = Program::new();
        let game = program.add_type(TypeDecl::class("Game").with_field("int", "score"));
        program.add_method(MethodDecl::instance(game, "Main").with_body(vec![Stmt::expr(
            Expr::field("score", game),
        )]));

        let err = run(&program, |gen, b| gen.generate_methods(b)).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::ResolutionInvariant(SymbolError::FieldOutsideReceiver { .. })
        ));
    }

    #[test]
    fn test_bodyless_method_is_an_invariant_violation() {
        let mut program = Program::new();
        let game = program.add_type(TypeDecl::class("Game"));
        let mut method = MethodDecl::instance(game, "Update");
        method.body = None;
        program.add_method(method);

        let err = run(&program, |gen, b| gen.generate_methods(b)).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::ResolutionInvariant(SymbolError::MissingBody { .. })
        ));
    }

    #[test]
    fn test_metrics_count_visited_declarations() {
        let mut program = Program::new();
        let game = program.add_type(TypeDecl::class("Game"));
        program.add_method(MethodDecl::instance(game, "Update"));

        let mut context = CodegenContext::new(&program, CodegenOptions::default()).unwrap();
        let mut metrics = CodegenMetrics::new();
        let mut builder = CCodeBuilder::new();
        {
            let mut gen = ItemGenerator::new(&mut context, &mut metrics);
            gen.generate_types(&mut builder).unwrap();
            gen.generate_constructors(&mut builder).unwrap();
            gen.generate_methods(&mut builder).unwrap();
        }
        assert_eq!(metrics.declarations_processed, 3);
    }
}
