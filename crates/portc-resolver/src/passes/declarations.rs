//! Declaration pass: register every top-level name.
//!
//! Names from all scripts share one namespace; scripts are processed in the
//! order given, so the first declaration of a clashing name wins and the
//! second one is reported.

use portc_core::ResolveError;
use portc_parser::ast::{Item, Modifiers, Script};

use crate::context::Context;

/// Counts of what was registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationOutput {
    pub classes: usize,
    pub enums: usize,
    pub delegates: usize,
}

pub struct DeclarationPass<'a, 'ast> {
    ctx: &'a mut Context<'ast>,
    output: DeclarationOutput,
}

impl<'a, 'ast> DeclarationPass<'a, 'ast> {
    pub fn new(ctx: &'a mut Context<'ast>) -> Self {
        Self {
            ctx,
            output: DeclarationOutput::default(),
        }
    }

    pub fn run(mut self, scripts: &[Script<'ast>]) -> Result<DeclarationOutput, ResolveError> {
        for script in scripts {
            for item in script.items() {
                self.visit_item(*item)?;
            }
        }
        Ok(self.output)
    }

    fn visit_item(&mut self, item: Item<'ast>) -> Result<(), ResolveError> {
        let program = &mut self.ctx.program;
        match item {
            Item::Class(decl) => {
                let id = program.register_class(decl.name.name, decl.name.span)?;
                let class = program.class_mut(id);
                class.is_public = decl.modifiers.contains(Modifiers::PUBLIC);
                class.is_abstract = decl.modifiers.contains(Modifiers::ABSTRACT);
                class.is_static = decl.modifiers.contains(Modifiers::STATIC);
                self.ctx.classes.push(decl);
                self.output.classes += 1;
            }
            Item::Enum(decl) => {
                let id = program.register_enum(decl.name.name, decl.name.span)?;
                program.enum_mut(id).is_public = decl.modifiers.contains(Modifiers::PUBLIC);
                self.ctx.add_enum_decl(decl);
                self.output.enums += 1;
            }
            Item::Delegate(decl) => {
                let id = program.register_delegate(decl.name.name, decl.name.span)?;
                program.delegate_mut(id).is_public = decl.modifiers.contains(Modifiers::PUBLIC);
                self.ctx.delegates.push(decl);
                self.output.delegates += 1;
            }
        }
        Ok(())
    }
}
