//! Override pass: check `virtual`, `override` and `abstract` against the
//! base classes.
//!
//! Runs once every class's methods are registered. A method may only reuse
//! an inherited signature by overriding it, and an override must keep the
//! return type and visibility of the method it replaces.

use portc_core::{ClassId, MethodId, ResolveError, SignatureHash, Virtuality};
use portc_registry::Program;

use crate::context::Context;

pub struct OverridePass<'a, 'ast> {
    ctx: &'a mut Context<'ast>,
    order: &'a [ClassId],
}

impl<'a, 'ast> OverridePass<'a, 'ast> {
    pub fn new(ctx: &'a mut Context<'ast>, order: &'a [ClassId]) -> Self {
        Self { ctx, order }
    }

    pub fn run(self) -> Result<(), ResolveError> {
        let program = &mut self.ctx.program;
        for &class in self.order {
            let methods = program.class(class).methods.clone();
            for method in methods {
                let overrides = check_method(program, class, method)?;
                program.method_mut(method).overrides = overrides;
            }
            check_implemented(program, class)?;
        }
        Ok(())
    }
}

/// Validate one method and return the method it overrides, if any.
fn check_method(program: &Program, class: ClassId, method: MethodId) -> Result<Option<MethodId>, ResolveError> {
    let entry = program.method(method);
    let owner = program.class(class);

    if entry.virtuality == Virtuality::Abstract && !owner.is_abstract {
        return Err(ResolveError::InvalidOverride {
            message: format!(
                "abstract method {} requires class {} to be abstract",
                entry.name, owner.name
            ),
            span: entry.span,
        });
    }

    let inherited = owner
        .base
        .and_then(|base| find_inherited(program, base, entry.signature));

    match (entry.virtuality, inherited) {
        (Virtuality::Override, Some(base_method)) => {
            let base_entry = program.method(base_method);
            if !base_entry.virtuality.is_dispatched() {
                return Err(ResolveError::InvalidOverride {
                    message: format!(
                        "{} cannot override non-virtual method {}",
                        program.method_path(method),
                        program.method_path(base_method)
                    ),
                    span: entry.span,
                });
            }
            if base_entry.return_type != entry.return_type {
                return Err(ResolveError::InvalidOverride {
                    message: format!(
                        "{} must return {} to override {}",
                        program.method_path(method),
                        base_entry.return_type.display(program),
                        program.method_path(base_method)
                    ),
                    span: entry.span,
                });
            }
            if base_entry.visibility != entry.visibility {
                return Err(ResolveError::InvalidOverride {
                    message: format!(
                        "{} must be {} to override {}",
                        program.method_path(method),
                        base_entry.visibility.as_str(),
                        program.method_path(base_method)
                    ),
                    span: entry.span,
                });
            }
            Ok(Some(base_method))
        }
        (Virtuality::Override, None) => Err(ResolveError::InvalidOverride {
            message: format!(
                "{} is marked override but no base class declares {}",
                program.method_path(method),
                program.method_signature_display(method)
            ),
            span: entry.span,
        }),
        // No name hiding: redeclaring an inherited signature is an error even
        // when neither method is virtual, and also for static methods.
        (_, Some(base_method)) => Err(ResolveError::InvalidOverride {
            message: format!(
                "{} redeclares inherited method {}; use override",
                program.method_path(method),
                program.method_path(base_method)
            ),
            span: entry.span,
        }),
        (_, None) => Ok(None),
    }
}

/// Nearest method with `signature` in `class` or its ancestors.
fn find_inherited(program: &Program, class: ClassId, signature: SignatureHash) -> Option<MethodId> {
    program.ancestors(class).find_map(|ancestor| {
        program
            .class(ancestor)
            .methods
            .iter()
            .copied()
            .find(|&m| program.method(m).signature == signature)
    })
}

fn check_implemented(program: &Program, class: ClassId) -> Result<(), ResolveError> {
    let entry = program.class(class);
    if entry.is_abstract {
        return Ok(());
    }

    // Walk base first so overrides replace the slot they inherit.
    let mut chain: Vec<ClassId> = program.ancestors(class).collect();
    chain.reverse();
    let mut slots: Vec<(SignatureHash, MethodId)> = Vec::new();
    for ancestor in chain {
        for &method in &program.class(ancestor).methods {
            let m = program.method(method);
            if !m.virtuality.is_dispatched() {
                continue;
            }
            match slots.iter_mut().find(|(sig, _)| *sig == m.signature) {
                Some(slot) => slot.1 = method,
                None => slots.push((m.signature, method)),
            }
        }
    }

    match slots
        .iter()
        .find(|(_, m)| program.method(*m).virtuality == Virtuality::Abstract)
    {
        Some(&(_, missing)) => Err(ResolveError::InvalidOverride {
            message: format!(
                "class {} does not implement abstract method {}",
                entry.name,
                program.method_path(missing)
            ),
            span: entry.span,
        }),
        None => Ok(()),
    }
}
