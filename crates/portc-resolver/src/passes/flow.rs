//! Flow pass: run control-flow verification on every resolved body.

use portc_core::{MethodId, ResolveFailure};
use portc_registry::Program;

use crate::flow;

pub struct FlowPass<'a> {
    program: &'a mut Program,
}

impl<'a> FlowPass<'a> {
    pub fn new(program: &'a mut Program) -> Self {
        Self { program }
    }

    /// Verify every method and record its warnings in source order.
    pub fn run(self) -> Result<usize, ResolveFailure> {
        let mut warnings = Vec::new();
        for index in 0..self.program.methods().len() {
            let method = MethodId::from_index(index);
            let report = flow::analyze(self.program, method).map_err(|error| ResolveFailure {
                error,
                method: Some(self.program.method_path(method)),
            })?;
            warnings.extend(report.warnings);
        }

        warnings.sort_by_key(|w| (w.span.source, w.span.line, w.span.col));
        let count = warnings.len();
        for warning in warnings {
            self.program.add_warning(warning);
        }
        Ok(count)
    }
}
