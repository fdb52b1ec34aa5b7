pub mod ast;
pub mod codegen;
pub mod config;
pub mod semantic;

pub use ast::{Expr, Program, Stmt, TypeDecl, TypeId, TypeRef};
pub use codegen::{CCodeGenerator, CodegenContext, CodegenError, CodegenResult};
pub use config::CodegenOptions;
pub use semantic::{Symbol, SymbolError, SymbolTable};
