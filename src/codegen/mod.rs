//! Code Generation Module for lowc
//!
//! This module lowers a bound program to C source text.
//!
//! Architecture:
//! - CodegenContext: per-run state (symbol lookup, generated names, representations)
//! - CCodeBuilder: the single linear output buffer
//! - Generators: items (three declaration passes), statements, expressions
//! - CCodeGenerator: runs the passes in order and assembles the output
//! - build: hands the output to a native C toolchain

use crate::ast::Program;
use crate::config::CodegenOptions;
use crate::semantic::{SymbolError, SymbolTable};
use std::time::Duration;
use thiserror::Error;

pub mod build;
pub mod c_gen;
pub mod expressions;
pub mod items;
pub mod names;
pub mod repr;
pub mod statements;

pub use c_gen::CCodeGenerator;
pub use names::NameTable;
pub use repr::{Representation, RepresentationResolver, TypeData};

/// Result type for code generation operations
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Errors that abort a code generation run. There is no partial output and
/// no recovery.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The input uses a construct this engine does not lower
    #[error("unsupported construct {kind}: {detail}")]
    UnsupportedConstruct { kind: String, detail: String },

    /// The frontend's resolution disagrees with what lowering relies on
    #[error("resolution invariant violated: {0}")]
    ResolutionInvariant(#[from] SymbolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The native compiler or the built program failed
    #[error("toolchain error: {0}")]
    Toolchain(String),
}

impl CodegenError {
    pub fn unsupported(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        CodegenError::UnsupportedConstruct {
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    /// Syntax kind carried by an unsupported-construct error
    pub fn unsupported_kind(&self) -> Option<&str> {
        match self {
            CodegenError::UnsupportedConstruct { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// State shared by every lowering call of one run
#[derive(Debug)]
pub struct CodegenContext<'p> {
    /// Declaration lookup over the bound program
    pub symbols: SymbolTable<'p>,
    /// Generated names, memoized for the whole run
    pub names: NameTable,
    /// Value/reference decision per declared type
    pub repr: RepresentationResolver,
    pub options: CodegenOptions,
}

impl<'p> CodegenContext<'p> {
    pub fn new(program: &'p Program, options: CodegenOptions) -> CodegenResult<Self> {
        let symbols = SymbolTable::new(program)?;
        let repr = RepresentationResolver::new(&symbols, &options.marker_attribute);

        Ok(Self {
            symbols,
            names: NameTable::new(),
            repr,
            options,
        })
    }
}

/// C code builder with indentation
#[derive(Debug, Clone, Default)]
pub struct CCodeBuilder {
    /// Current indentation level
    indent_level: usize,
    /// Generated code buffer
    code: String,
}

impl CCodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line with proper indentation
    pub fn line(&mut self, text: &str) {
        self.indent();
        self.code.push_str(text);
        self.newline();
    }

    fn indent(&mut self) {
        for _ in 0..self.indent_level {
            self.code.push_str("    ");
        }
    }

    pub fn newline(&mut self) {
        self.code.push('\n');
    }

    pub fn indent_inc(&mut self) {
        self.indent_level += 1;
    }

    pub fn indent_dec(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Add opening brace and increase indentation
    pub fn open_block(&mut self) {
        self.line("{");
        self.indent_inc();
    }

    /// Add closing brace and decrease indentation
    pub fn close_block(&mut self) {
        self.indent_dec();
        self.line("}");
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn finish(self) -> String {
        self.code
    }
}

/// Counters for one code generation run
#[derive(Debug, Default, Clone)]
pub struct CodegenMetrics {
    /// Declarations visited across all three passes
    pub declarations_processed: usize,
    pub lines_generated: usize,
    pub elapsed: Duration,
}

impl CodegenMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_declaration(&mut self) {
        self.declarations_processed += 1;
    }

    pub fn record_lines(&mut self, count: usize) {
        self.lines_generated += count;
    }

    pub fn lines_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.lines_generated as f64 / secs
        }
    }
}
