//! Control-flow verification over the typed IR.
//!
//! Tracks, along every path, which locals are definitely assigned. The state
//! at a point is `None` when the point is unreachable; joining two states
//! keeps only the locals assigned on both paths. Loop bodies only ever add
//! assignments, so one pass over each loop is enough. Conditions split the
//! state in two: what holds when they are true and what holds when false.
//!
//! Reports `UseBeforeAssignment`, `MissingReturn` and `CaseFallThrough` as
//! errors. Unreachable statements produce one warning per block, at the first
//! statement that cannot run.

use portc_core::ir::{Expr, ExprKind, Receiver, Stmt, StmtKind};
use portc_core::{AssignOp, BinaryOp, Diagnostic, LocalEntry, LocalId, MethodId, ResolveError, UnaryOp};
use portc_registry::Program;

use crate::checker::const_value;

type State = Option<Vec<bool>>;

fn join(a: State, b: State) -> State {
    match (a, b) {
        (None, other) | (other, None) => other,
        (Some(a), Some(b)) => Some(a.iter().zip(&b).map(|(x, y)| *x && *y).collect()),
    }
}

/// Result of analysing one method.
#[derive(Debug, Default)]
pub struct FlowReport {
    pub warnings: Vec<Diagnostic>,
}

/// Analyse the body of `method`.
pub fn analyze(program: &Program, method: MethodId) -> Result<FlowReport, ResolveError> {
    let entry = program.method(method);
    let Some(body) = &entry.body else {
        return Ok(FlowReport::default());
    };

    let mut flow = Flow {
        program,
        method,
        locals: &entry.locals,
        breaks: Vec::new(),
        continues: Vec::new(),
        warnings: Vec::new(),
    };
    let end = flow.block(&body.stmts, Some(vec![false; entry.locals.len()]))?;

    if end.is_some() && !entry.return_type.is_void() && !entry.is_constructor() {
        return Err(ResolveError::MissingReturn {
            method: program.method_path(method),
            span: entry.span,
        });
    }
    Ok(FlowReport {
        warnings: flow.warnings,
    })
}

struct Flow<'p> {
    program: &'p Program,
    method: MethodId,
    locals: &'p [LocalEntry],
    /// States flowing out of each enclosing loop or switch through `break`.
    breaks: Vec<State>,
    /// States flowing back to each enclosing loop through `continue`.
    continues: Vec<State>,
    warnings: Vec<Diagnostic>,
}

impl Flow<'_> {
    fn block(&mut self, stmts: &[Stmt], state: State) -> Result<State, ResolveError> {
        let entered = state.is_some();
        let mut state = state;
        let mut warned = false;
        for stmt in stmts {
            if entered && state.is_none() && !warned && !is_empty(stmt) {
                self.warnings.push(
                    Diagnostic::warning("unreachable code detected", stmt.span)
                        .with_method(Some(self.program.method_path(self.method))),
                );
                warned = true;
            }
            state = self.stmt(stmt, state)?;
        }
        Ok(state)
    }

    fn stmt(&mut self, stmt: &Stmt, state: State) -> Result<State, ResolveError> {
        match &stmt.kind {
            StmtKind::Block(block) => self.block(&block.stmts, state),
            StmtKind::Expr(e) => self.expr(e, state),
            StmtKind::Local { local, init } => {
                let mut state = match init {
                    Some(init) => self.expr(init, state)?,
                    None => state,
                };
                let fixed = self.locals[local.index()].ty.fixed_len().is_some();
                if init.is_some() || fixed {
                    assign(&mut state, *local);
                }
                Ok(state)
            }
            StmtKind::LocalConst(_) => Ok(state),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let (then_in, else_in) = self.cond(cond, state)?;
                let then_out = self.stmt(then_branch, then_in)?;
                let else_out = match else_branch {
                    Some(e) => self.stmt(e, else_in)?,
                    None => else_in,
                };
                Ok(join(then_out, else_out))
            }
            StmtKind::While { cond, body } => {
                let (body_in, exit) = self.cond(cond, state)?;
                let (breaks, _) = self.in_loop(|flow| flow.stmt(body, body_in))?;
                Ok(join(exit, breaks))
            }
            StmtKind::DoWhile { body, cond } => {
                let (breaks, (end, continues)) = self.in_loop(|flow| flow.stmt(body, state))?;
                let (_, exit) = self.cond(cond, join(end, continues))?;
                Ok(join(exit, breaks))
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let state = match init {
                    Some(init) => self.stmt(init, state)?,
                    None => state,
                };
                let (body_in, exit) = match cond {
                    Some(cond) => self.cond(cond, state)?,
                    None => (state, None),
                };
                let (breaks, (end, continues)) = self.in_loop(|flow| flow.stmt(body, body_in))?;
                if let Some(step) = step {
                    self.expr(step, join(end, continues))?;
                }
                Ok(join(exit, breaks))
            }
            StmtKind::Switch { value, cases } => {
                let state = self.expr(value, state)?;
                self.breaks.push(None);
                for case in cases {
                    let end = self.block(&case.body, state.clone())?;
                    if end.is_some() {
                        return Err(ResolveError::CaseFallThrough { span: case.span });
                    }
                }
                let breaks = self.breaks.pop().flatten();
                let has_default = cases.iter().any(|c| c.is_default);
                Ok(join(if has_default { None } else { state }, breaks))
            }
            StmtKind::Break => {
                if let Some(target) = self.breaks.last_mut() {
                    *target = join(target.take(), state);
                }
                Ok(None)
            }
            StmtKind::Continue => {
                if let Some(target) = self.continues.last_mut() {
                    *target = join(target.take(), state);
                }
                Ok(None)
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value, state)?;
                }
                Ok(None)
            }
            StmtKind::Throw(value) => {
                self.expr(value, state)?;
                Ok(None)
            }
        }
    }

    /// Run `f` as a loop body, returning the `break` states and, alongside
    /// `f`'s own result, the `continue` states.
    fn in_loop<F>(&mut self, f: F) -> Result<(State, (State, State)), ResolveError>
    where
        F: FnOnce(&mut Self) -> Result<State, ResolveError>,
    {
        self.breaks.push(None);
        self.continues.push(None);
        let end = f(self);
        let continues = self.continues.pop().flatten();
        let breaks = self.breaks.pop().flatten();
        Ok((breaks, (end?, continues)))
    }

    /// Analyse a condition, returning the states after it is true and after
    /// it is false. A constant condition makes the other branch unreachable.
    fn cond(&mut self, cond: &Expr, state: State) -> Result<(State, State), ResolveError> {
        let split = match &cond.kind {
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let (left_true, left_false) = self.cond(left, state)?;
                let (right_true, right_false) = self.cond(right, left_true)?;
                (right_true, join(left_false, right_false))
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let (left_true, left_false) = self.cond(left, state)?;
                let (right_true, right_false) = self.cond(right, left_false)?;
                (join(left_true, right_true), right_false)
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                let (when_true, when_false) = self.cond(operand, state)?;
                (when_false, when_true)
            }
            _ => {
                let state = self.expr(cond, state)?;
                (state.clone(), state)
            }
        };
        Ok(match self.const_bool(cond) {
            Some(true) => (join(split.0, split.1), None),
            Some(false) => (None, join(split.0, split.1)),
            None => split,
        })
    }

    fn expr(&mut self, expr: &Expr, state: State) -> Result<State, ResolveError> {
        match &expr.kind {
            ExprKind::Local(local) => {
                self.read(*local, &state, expr)?;
                Ok(state)
            }
            ExprKind::Assign { op, target, value } => {
                if let (AssignOp::Assign, ExprKind::Local(local)) = (op, &target.kind) {
                    let mut state = self.expr(value, state)?;
                    assign(&mut state, *local);
                    return Ok(state);
                }
                let state = self.expr(target, state)?;
                self.expr(value, state)
            }
            ExprKind::Binary {
                op: BinaryOp::And | BinaryOp::Or,
                ..
            } => {
                let (when_true, when_false) = self.cond(expr, state)?;
                Ok(join(when_true, when_false))
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let (when_true, when_false) = self.cond(cond, state)?;
                let a = self.expr(then_expr, when_true)?;
                let b = self.expr(else_expr, when_false)?;
                Ok(join(a, b))
            }
            ExprKind::Field { object, .. } => self.expr(object, state),
            ExprKind::Index { object, index } => {
                let state = self.expr(object, state)?;
                self.expr(index, state)
            }
            ExprKind::StringLength(inner)
            | ExprKind::Unary { operand: inner, .. }
            | ExprKind::IncDec { target: inner, .. }
            | ExprKind::Cast(inner)
            | ExprKind::Coerce { expr: inner, .. } => self.expr(inner, state),
            ExprKind::Binary { left, right, .. } => {
                let state = self.expr(left, state)?;
                self.expr(right, state)
            }
            ExprKind::Call { receiver, args, .. } => {
                let mut state = match receiver {
                    Receiver::Object(object) => self.expr(object, state)?,
                    _ => state,
                };
                for arg in args {
                    state = self.expr(arg, state)?;
                }
                Ok(state)
            }
            ExprKind::DelegateCall { callee, args, .. } => {
                let mut state = self.expr(callee, state)?;
                for arg in args {
                    state = self.expr(arg, state)?;
                }
                Ok(state)
            }
            ExprKind::NewArray { len, .. } => self.expr(len, state),
            ExprKind::Literal(_)
            | ExprKind::Const(_)
            | ExprKind::EnumValue { .. }
            | ExprKind::Param(_)
            | ExprKind::This
            | ExprKind::MethodRef(_)
            | ExprKind::New(_)
            | ExprKind::Resource(_) => Ok(state),
        }
    }

    fn read(&self, local: LocalId, state: &State, expr: &Expr) -> Result<(), ResolveError> {
        match state {
            Some(assigned) if !assigned[local.index()] => Err(ResolveError::UseBeforeAssignment {
                name: self.locals[local.index()].name.clone(),
                span: expr.span,
            }),
            _ => Ok(()),
        }
    }

    fn const_bool(&self, cond: &Expr) -> Option<bool> {
        const_value(self.program, cond).and_then(|v| v.as_bool())
    }
}

fn assign(state: &mut State, local: LocalId) {
    if let Some(assigned) = state {
        assigned[local.index()] = true;
    }
}

/// Statements that produce no code.
fn is_empty(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Block(block) => block.stmts.iter().all(is_empty),
        StmtKind::LocalConst(_) => true,
        _ => false,
    }
}
