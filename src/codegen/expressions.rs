//! Expression Code Generation
//!
//! Each expression lowers to one fragment of C text. Dispatch is on the
//! expression kind plus the symbol the frontend resolved for the node.
//! Binary results are always parenthesized, so operator precedence never
//! has to be re-derived.
//!
//! Generated names are allocated on first request, so the order in which the
//! arms below ask for them is what fixes the numbering in the output.

use super::{CodegenContext, CodegenError, CodegenResult, Representation, TypeData};
use crate::ast::{CollectionElement, CtorId, Expr, LiteralKind, MethodId, TypeId, TypeRef};
use crate::semantic::{DeclRef, Symbol, SymbolError};

/// Expression code generator for one function body
pub struct ExpressionGenerator<'a, 'p> {
    context: &'a mut CodegenContext<'p>,
    /// Type whose method is being lowered; `None` inside the entry point
    receiver: Option<TypeId>,
}

impl<'a, 'p> ExpressionGenerator<'a, 'p> {
    pub fn new(context: &'a mut CodegenContext<'p>, receiver: Option<TypeId>) -> Self {
        Self { context, receiver }
    }

    /// Generate C code for an expression
    pub fn generate_expression(&mut self, expr: &Expr) -> CodegenResult<String> {
        match expr {
            Expr::Invocation {
                receiver,
                method,
                args,
            } => self.generate_invocation(receiver.as_deref(), *method, args),
            Expr::ElementAccess { target, index } => {
                let target = self.generate_expression(target)?;
                let index = self.generate_expression(index)?;
                Ok(format!("{}[{}]", target, index))
            }
            Expr::Collection {
                converted_type,
                elements,
            } => self.generate_collection(converted_type, elements),
            Expr::Binary { left, op, right } => {
                let left = self.generate_expression(left)?;
                let right = self.generate_expression(right)?;
                Ok(format!("({} {} {})", left, op, right))
            }
            Expr::Identifier { name, symbol } => self.generate_identifier(name, symbol),
            Expr::ImplicitObjectCreation { .. } => Err(CodegenError::unsupported(
                expr.kind_name(),
                "only lowered as the initializer of a local declaration",
            )),
            Expr::ObjectCreation {
                ty,
                constructor,
                args,
            } => self.generate_object_creation(*ty, *constructor, args),
            Expr::MemberAccess {
                target,
                name,
                symbol,
            } => self.generate_member_access(target, name, symbol),
            Expr::Literal { literal, text } => self.generate_literal(*literal, text),
            Expr::PrefixUnary { op, operand } => match op.as_str() {
                "!" | "-" => {
                    let operand = self.generate_expression(operand)?;
                    Ok(format!("{}{}", op, operand))
                }
                _ => Err(CodegenError::unsupported(
                    expr.kind_name(),
                    format!("prefix operator '{}'", op),
                )),
            },
            Expr::Initializer { elements } => {
                let elements = self.generate_arguments(elements)?;
                Ok(format!("{{{}}}", elements.join(", ")))
            }
            Expr::Assignment { left, op, right } => {
                let right = self.generate_expression(right)?;
                let left = self.generate_expression(left)?;
                Ok(format!("{} {} {}", left, op, right))
            }
            Expr::Unsupported { syntax_kind } => Err(CodegenError::unsupported(
                syntax_kind.as_str(),
                "expression kind is not lowered",
            )),
        }
    }

    /// Lower each argument in order
    pub fn generate_arguments(&mut self, args: &[Expr]) -> CodegenResult<Vec<String>> {
        args.iter()
            .map(|arg| self.generate_expression(arg))
            .collect()
    }

    /// Resolve a type through the run's representation cache
    pub fn resolve_type(&mut self, ty: &TypeRef) -> CodegenResult<TypeData> {
        let context = &mut *self.context;
        context
            .repr
            .resolve(&context.symbols, &mut context.names, ty)
    }

    fn name_of(&mut self, decl: DeclRef) -> CodegenResult<String> {
        let context = &mut *self.context;
        context.names.name_of(&context.symbols, decl)
    }

    fn generate_invocation(
        &mut self,
        receiver: Option<&Expr>,
        method_id: MethodId,
        args: &[Expr],
    ) -> CodegenResult<String> {
        let method = self.context.symbols.method(method_id)?;

        if method.is_native {
            if method.name == self.context.options.print_primitive && args.len() == 1 {
                let value = self.generate_expression(&args[0])?;
                return Ok(format!("printf(\"%s\\n\", {})", value));
            }
            let args = self.generate_arguments(args)?;
            return Ok(format!("{}({})", method.name, args.join(", ")));
        }

        let receiver = match (receiver, self.receiver) {
            (Some(receiver), _) => self.generate_expression(receiver)?,
            (None, Some(_)) => "this".to_string(),
            (None, None) => {
                return Err(SymbolError::MissingReceiver {
                    method: method.name.clone(),
                }
                .into())
            }
        };
        let name = self.name_of(DeclRef::Method(method_id))?;

        let mut all_args = vec![receiver];
        all_args.extend(self.generate_arguments(args)?);
        Ok(format!("{}({})", name, all_args.join(", ")))
    }

    fn generate_collection(
        &mut self,
        converted_type: &TypeRef,
        elements: &[CollectionElement],
    ) -> CodegenResult<String> {
        let TypeRef::Array { element } = converted_type else {
            return Err(CodegenError::unsupported(
                "CollectionExpression",
                "only fixed-size arrays are lowered",
            ));
        };
        let element_type = self.resolve_type(element)?;

        let mut lowered = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                CollectionElement::Expression { expr } => {
                    lowered.push(self.generate_expression(expr)?);
                }
                CollectionElement::Spread { .. } => {
                    return Err(CodegenError::unsupported(
                        "SpreadElement",
                        "spread elements are not lowered",
                    ));
                }
            }
        }

        Ok(format!(
            "({}[{}]){{{}}}",
            element_type.name,
            elements.len(),
            lowered.join(", ")
        ))
    }

    fn generate_identifier(&mut self, name: &str, symbol: &Symbol) -> CodegenResult<String> {
        let Symbol::Field { owner } = symbol else {
            return Ok(name.to_string());
        };

        match (*owner, self.receiver) {
            (Some(owner), Some(receiver)) if owner == receiver => Ok(format!("this->{}", name)),
            _ => {
                let symbols = &self.context.symbols;
                Err(SymbolError::FieldOutsideReceiver {
                    field: name.to_string(),
                    owner: owner
                        .map(|id| symbols.type_name(id))
                        .unwrap_or_else(|| "an external type".to_string()),
                    receiver: self
                        .receiver
                        .map(|id| symbols.type_name(id))
                        .unwrap_or_else(|| "the entry point".to_string()),
                }
                .into())
            }
        }
    }

    fn generate_object_creation(
        &mut self,
        ty: TypeId,
        constructor: Option<CtorId>,
        args: &[Expr],
    ) -> CodegenResult<String> {
        if self.context.repr.representation(ty)? == Representation::Value {
            let name = self.name_of(DeclRef::Type(ty))?;
            let args = self.generate_arguments(args)?;
            let fields = if args.is_empty() {
                "0".to_string()
            } else {
                args.join(", ")
            };
            return Ok(format!("({}){{{}}}", name, fields));
        }

        let name = match constructor {
            None => {
                let context = &mut *self.context;
                context.names.default_constructor_name(&context.symbols, ty)?
            }
            Some(ctor) => self.name_of(DeclRef::Constructor(ctor))?,
        };
        let args = self.generate_arguments(args)?;
        Ok(format!("{}({})", name, args.join(", ")))
    }

    fn generate_member_access(
        &mut self,
        target: &Expr,
        name: &str,
        symbol: &Symbol,
    ) -> CodegenResult<String> {
        match symbol {
            Symbol::Property { property } => {
                let property = self.context.symbols.property(*property)?;
                if property.is_native {
                    Ok(property.name.clone())
                } else {
                    Err(CodegenError::unsupported(
                        "PropertyAccess",
                        format!("property '{}' is not extern", property.name),
                    ))
                }
            }
            Symbol::EnumMember => Ok(name.to_string()),
            Symbol::Field { .. } => {
                let target = self.generate_expression(target)?;
                Ok(format!("{}.{}", target, name))
            }
            Symbol::Method { .. } | Symbol::Local | Symbol::Type => {
                self.generate_expression(target)
            }
        }
    }

    fn generate_literal(&self, literal: LiteralKind, text: &str) -> CodegenResult<String> {
        match literal {
            LiteralKind::String => Ok(format!("\"{}\"", text)),
            LiteralKind::True => Ok("1".to_string()),
            LiteralKind::False => Ok("0".to_string()),
            LiteralKind::Numeric => Ok(text.to_string()),
            LiteralKind::Character => Err(CodegenError::unsupported(
                "CharacterLiteralExpression",
                format!("literal {}", text),
            )),
            LiteralKind::Null => Err(CodegenError::unsupported(
                "NullLiteralExpression",
                "null has no lowering",
            )),
        }
    }
}
