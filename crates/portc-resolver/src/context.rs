//! Resolution context shared by every pass.
//!
//! Owns the [`Program`] being built and remembers, for every registered
//! entity, the declaration it came from. Class constants and enum values are
//! evaluated on first use, so a constant may refer to one declared later; a
//! constant that (transitively) refers to itself is `NotConstant`.

use rustc_hash::FxHashMap;

use portc_core::{ClassId, ConstId, ConstOwner, EnumId, MethodId, ResolveError, Span, Type};
use portc_parser::ast::{Block, ClassDecl, ConstDecl, DelegateDecl, EnumDecl, TypeExpr};
use portc_registry::Program;

use crate::checker::Checker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvalState {
    Pending,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct PendingConst<'ast> {
    decl: &'ast ConstDecl<'ast>,
    state: EvalState,
}

/// Program under construction plus the declarations behind it.
pub struct Context<'ast> {
    pub program: Program,
    /// Class declarations, indexed by `ClassId`.
    pub(crate) classes: Vec<&'ast ClassDecl<'ast>>,
    /// Enum declarations, indexed by `EnumId`.
    pub(crate) enums: Vec<&'ast EnumDecl<'ast>>,
    /// Delegate declarations, indexed by `DelegateId`.
    pub(crate) delegates: Vec<&'ast DelegateDecl<'ast>>,
    /// Method bodies in registration order.
    pub(crate) bodies: Vec<(MethodId, &'ast Block<'ast>)>,
    consts: FxHashMap<ConstId, PendingConst<'ast>>,
    enum_states: Vec<EvalState>,
}

impl<'ast> Context<'ast> {
    pub fn new() -> Self {
        Self {
            program: Program::new(),
            classes: Vec::new(),
            enums: Vec::new(),
            delegates: Vec::new(),
            bodies: Vec::new(),
            consts: FxHashMap::default(),
            enum_states: Vec::new(),
        }
    }

    pub(crate) fn add_enum_decl(&mut self, decl: &'ast EnumDecl<'ast>) {
        self.enums.push(decl);
        self.enum_states.push(EvalState::Pending);
    }

    /// Remember the initializer of a class constant for lazy evaluation.
    pub(crate) fn defer_const(&mut self, id: ConstId, decl: &'ast ConstDecl<'ast>) {
        self.consts.insert(
            id,
            PendingConst {
                decl,
                state: EvalState::Pending,
            },
        );
    }

    /// Evaluate a class constant if that has not happened yet.
    pub fn ensure_const(&mut self, id: ConstId, span: Span) -> Result<(), ResolveError> {
        let Some(pending) = self.consts.get(&id).copied() else {
            return Ok(());
        };
        match pending.state {
            EvalState::Done => return Ok(()),
            EvalState::InProgress => {
                return Err(ResolveError::not_constant(
                    span,
                    format!("constant {} depends on itself", pending.decl.name.name),
                ));
            }
            EvalState::Pending => {}
        }

        self.set_const_state(id, EvalState::InProgress);
        let class = match self.program.const_entry(id).owner {
            ConstOwner::Class(class) => class,
            ConstOwner::Method(method) => self.program.method(method).owner,
        };
        let (ty, value) = Checker::constant(self, Some(class)).eval_const(pending.decl)?;

        let entry = self.program.const_mut(id);
        entry.ty = ty;
        entry.value = Some(value);
        self.set_const_state(id, EvalState::Done);
        tracing::trace!(name = pending.decl.name.name, "evaluated constant");
        Ok(())
    }

    fn set_const_state(&mut self, id: ConstId, state: EvalState) {
        if let Some(pending) = self.consts.get_mut(&id) {
            pending.state = state;
        }
    }

    /// Whether an enum's values are currently being evaluated.
    pub(crate) fn enum_in_progress(&self, id: EnumId) -> bool {
        self.enum_states.get(id.index()) == Some(&EvalState::InProgress)
    }

    /// Evaluate the values of an enum if that has not happened yet.
    pub fn ensure_enum(&mut self, id: EnumId) -> Result<(), ResolveError> {
        match self.enum_states.get(id.index()) {
            Some(EvalState::Pending) => {}
            _ => return Ok(()),
        }
        self.enum_states[id.index()] = EvalState::InProgress;
        let decl = self.enums[id.index()];
        Checker::enum_values(self, id).eval_enum(decl)?;
        self.enum_states[id.index()] = EvalState::Done;
        Ok(())
    }

    /// Resolve a type written outside any method body.
    pub fn resolve_type(&mut self, ty: &TypeExpr<'_>, class: Option<ClassId>) -> Result<Type, ResolveError> {
        Checker::constant(self, class).resolve_type(ty)
    }
}

impl Default for Context<'_> {
    fn default() -> Self {
        Self::new()
    }
}
