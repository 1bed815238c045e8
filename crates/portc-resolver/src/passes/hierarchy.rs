//! Hierarchy pass: resolve base classes.
//!
//! A base must name a class. Static classes neither derive nor are derived
//! from. Cycles are found by the program's inheritance graph.

use portc_core::{ClassId, ResolveError};
use portc_registry::GlobalSymbol;

use crate::context::Context;

pub struct HierarchyPass<'a, 'ast> {
    ctx: &'a mut Context<'ast>,
}

impl<'a, 'ast> HierarchyPass<'a, 'ast> {
    pub fn new(ctx: &'a mut Context<'ast>) -> Self {
        Self { ctx }
    }

    /// Link every class to its base and return all classes, bases first.
    pub fn run(self) -> Result<Vec<ClassId>, ResolveError> {
        for (index, decl) in self.ctx.classes.iter().enumerate() {
            let Some(base_name) = decl.base else {
                continue;
            };
            let id = ClassId::from_index(index);
            let program = &mut self.ctx.program;
            let base = match program.lookup_global(base_name.name) {
                Some(GlobalSymbol::Class(base)) => base,
                _ => {
                    return Err(ResolveError::UnknownBaseClass {
                        name: base_name.name.to_string(),
                        span: base_name.span,
                    });
                }
            };
            if program.class(base).is_static || program.class(id).is_static {
                return Err(ResolveError::type_mismatch(
                    base_name.span,
                    "static classes cannot take part in inheritance",
                ));
            }
            program.class_mut(id).base = Some(base);
        }
        self.ctx.program.link_hierarchy()
    }
}
