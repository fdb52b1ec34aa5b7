//! Semantic information handed over by the frontend
//!
//! Parsing and type checking happen upstream; this module only provides:
//! - The resolved-symbol vocabulary carried on expression nodes
//! - Declaration lookup by stable id

pub mod symbols;

pub use symbols::{DeclRef, Symbol, SymbolError, SymbolResult, SymbolTable};
