//! Body pass: type check every method body into IR.

use portc_core::ResolveFailure;

use crate::checker::Checker;
use crate::context::Context;

pub struct BodyPass<'a, 'ast> {
    ctx: &'a mut Context<'ast>,
}

impl<'a, 'ast> BodyPass<'a, 'ast> {
    pub fn new(ctx: &'a mut Context<'ast>) -> Self {
        Self { ctx }
    }

    /// Check each body in registration order; returns how many were checked.
    pub fn run(self) -> Result<usize, ResolveFailure> {
        let bodies = std::mem::take(&mut self.ctx.bodies);
        for &(method, block) in &bodies {
            let (body, locals) = Checker::method(self.ctx, method)
                .check_body(block)
                .map_err(|error| ResolveFailure {
                    error,
                    method: Some(self.ctx.program.method_path(method)),
                })?;
            tracing::trace!(
                method = %self.ctx.program.method_path(method),
                locals = locals.len(),
                "checked body"
            );
            let entry = self.ctx.program.method_mut(method);
            entry.body = Some(body);
            entry.locals = locals;
        }
        Ok(bodies.len())
    }
}
