//! C code generator entry point
//!
//! Runs one lowering of a bound program: header directives, then the three
//! declaration passes in order. The output is returned only if every pass
//! succeeds.

use super::{items::ItemGenerator, CCodeBuilder, CodegenContext, CodegenMetrics, CodegenResult};
use crate::ast::Program;
use crate::config::CodegenOptions;
use std::time::Instant;

/// Main C code generator
pub struct CCodeGenerator<'p> {
    context: CodegenContext<'p>,
    metrics: CodegenMetrics,
}

impl<'p> CCodeGenerator<'p> {
    /// Index the program and check its cross references
    pub fn new(program: &'p Program, options: CodegenOptions) -> CodegenResult<Self> {
        Ok(Self {
            context: CodegenContext::new(program, options)?,
            metrics: CodegenMetrics::new(),
        })
    }

    /// Lower the whole program to one C translation unit
    pub fn generate(&mut self) -> CodegenResult<String> {
        let start = Instant::now();
        let mut builder = CCodeBuilder::new();

        for header in &self.context.options.headers {
            builder.line(header);
        }
        builder.newline();

        {
            let mut items = ItemGenerator::new(&mut self.context, &mut self.metrics);

            log::debug!("pass 1: types");
            items.generate_types(&mut builder)?;
            log::debug!("pass 2: constructors");
            items.generate_constructors(&mut builder)?;
            log::debug!("pass 3: methods");
            items.generate_methods(&mut builder)?;
        }

        let code = builder.finish();
        self.metrics.record_lines(code.lines().count());
        self.metrics.elapsed = start.elapsed();
        log::debug!(
            "generated {} lines from {} declarations in {:?}",
            self.metrics.lines_generated,
            self.metrics.declarations_processed,
            self.metrics.elapsed
        );

        Ok(code)
    }

    pub fn metrics(&self) -> &CodegenMetrics {
        &self.metrics
    }
}
