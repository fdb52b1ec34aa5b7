//! Statement Code Generation
//!
//! Statements lower one at a time, in source order, straight into the output
//! builder. Only expression statements, `while`, blocks and local declarations
//! are lowered; every other statement kind aborts the run.

use super::{
    expressions::ExpressionGenerator, CCodeBuilder, CodegenContext, CodegenError, CodegenResult,
};
use crate::ast::{Expr, MemberInit, Stmt, TypeId, TypeRef};

/// Statement code generator
pub struct StatementGenerator<'a, 'p> {
    context: &'a mut CodegenContext<'p>,
    /// Type whose method body is being lowered
    receiver: Option<TypeId>,
}

impl<'a, 'p> StatementGenerator<'a, 'p> {
    pub fn new(context: &'a mut CodegenContext<'p>, receiver: Option<TypeId>) -> Self {
        Self { context, receiver }
    }

    /// Create an expression generator on demand
    fn create_expr_generator(&mut self) -> ExpressionGenerator<'_, 'p> {
        ExpressionGenerator::new(self.context, self.receiver)
    }

    /// Generate C code for a statement
    pub fn generate_statement(
        &mut self,
        stmt: &Stmt,
        builder: &mut CCodeBuilder,
    ) -> CodegenResult<()> {
        log::trace!("lowering {}", stmt.kind_name());

        match stmt {
            Stmt::Expression { expr } => {
                let code = self.create_expr_generator().generate_expression(expr)?;
                builder.line(&format!("{};", code));
                Ok(())
            }
            Stmt::While { condition, body } => self.generate_while_loop(condition, body, builder),
            Stmt::Block { statements } => self.generate_block(statements, builder),
            Stmt::LocalDecl {
                name,
                ty,
                initializer,
            } => self.generate_local(name, ty, initializer.as_ref(), builder),
            Stmt::Unsupported { syntax_kind } => Err(CodegenError::unsupported(
                syntax_kind.as_str(),
                "statement kind is not lowered",
            )),
        }
    }

    /// Brace-delimited statement sequence
    pub fn generate_block(
        &mut self,
        statements: &[Stmt],
        builder: &mut CCodeBuilder,
    ) -> CodegenResult<()> {
        builder.open_block();
        for stmt in statements {
            self.generate_statement(stmt, builder)?;
        }
        builder.close_block();
        Ok(())
    }

    fn generate_while_loop(
        &mut self,
        condition: &Expr,
        body: &Stmt,
        builder: &mut CCodeBuilder,
    ) -> CodegenResult<()> {
        let condition = self.create_expr_generator().generate_expression(condition)?;
        builder.line(&format!("while({})", condition));

        if matches!(body, Stmt::Block { .. }) {
            self.generate_statement(body, builder)
        } else {
            builder.indent_inc();
            let result = self.generate_statement(body, builder);
            builder.indent_dec();
            result
        }
    }

    fn generate_local(
        &mut self,
        name: &str,
        ty: &TypeRef,
        initializer: Option<&Expr>,
        builder: &mut CCodeBuilder,
    ) -> CodegenResult<()> {
        let type_name = self.local_type_name(ty)?;

        match initializer {
            None => builder.line(&format!("{} {};", type_name, name)),
            Some(Expr::ImplicitObjectCreation { args, initializers }) => {
                if !args.is_empty() {
                    return Err(CodegenError::unsupported(
                        "ImplicitObjectCreationExpression",
                        format!("constructor arguments when initializing '{}'", name),
                    ));
                }
                builder.line(&format!("{} {} = {{0}};", type_name, name));
                self.generate_member_assignments(name, initializers, builder)?;
            }
            Some(expr) => {
                let value = self.create_expr_generator().generate_expression(expr)?;
                builder.line(&format!("{} {} = {};", type_name, name, value));
            }
        }

        Ok(())
    }

    /// C spelling of a local's type: arrays decay to an element pointer,
    /// reference types are pointers, value types are used as is
    fn local_type_name(&mut self, ty: &TypeRef) -> CodegenResult<String> {
        let mut expr_gen = self.create_expr_generator();
        match ty {
            TypeRef::Array { element } => Ok(format!("{}*", expr_gen.resolve_type(element)?.name)),
            _ => {
                let data = expr_gen.resolve_type(ty)?;
                if data.is_value() {
                    Ok(data.name)
                } else {
                    Ok(format!("{}*", data.name))
                }
            }
        }
    }

    fn generate_member_assignments(
        &mut self,
        variable: &str,
        initializers: &[MemberInit],
        builder: &mut CCodeBuilder,
    ) -> CodegenResult<()> {
        for init in initializers {
            let value = self.create_expr_generator().generate_expression(&init.value)?;
            builder.line(&format!("{}.{} = {};", variable, init.member, value));
        }
        Ok(())
    }
}
