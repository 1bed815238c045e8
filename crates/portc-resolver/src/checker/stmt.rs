//! Statement checking.

use rustc_hash::FxHashSet;

use portc_core::ir::{self, Expr, ExprKind, Stmt, StmtKind};
use portc_core::{ConstEntry, ConstId, ConstOwner, LocalEntry, LocalId, ResolveError, Type, Visibility};
use portc_parser::ast::{self, ConstDecl, ForStmt, ReturnStmt, SwitchStmt, VarDeclStmt};

use super::{Checker, JumpTarget, const_value};
use crate::scope::LocalBinding;

impl Checker<'_, '_> {
    /// Check a method body, returning its IR and the locals it declares.
    pub fn check_body(mut self, body: &ast::Block<'_>) -> Result<(ir::Block, Vec<LocalEntry>), ResolveError> {
        let block = self.block(body)?;
        Ok((block, self.env.locals))
    }

    fn block(&mut self, block: &ast::Block<'_>) -> Result<ir::Block, ResolveError> {
        self.env.scope.push_scope();
        let stmts = self.stmts(block.stmts)?;
        self.env.scope.pop_scope();
        Ok(ir::Block {
            stmts,
            span: block.span,
        })
    }

    fn stmts(&mut self, stmts: &[ast::Stmt<'_>]) -> Result<Vec<Stmt>, ResolveError> {
        stmts.iter().map(|s| self.stmt(s)).collect()
    }

    /// A statement that is its own scope when it is not a block.
    fn scoped(&mut self, s: &ast::Stmt<'_>) -> Result<Box<Stmt>, ResolveError> {
        self.env.scope.push_scope();
        let stmt = self.stmt(s);
        self.env.scope.pop_scope();
        stmt.map(Box::new)
    }

    fn stmt(&mut self, s: &ast::Stmt<'_>) -> Result<Stmt, ResolveError> {
        let span = s.span();
        let kind = match s {
            ast::Stmt::Block(b) => StmtKind::Block(self.block(b)?),
            ast::Stmt::Expr(e) => StmtKind::Expr(self.statement_expr(e.expr)?),
            ast::Stmt::VarDecl(v) => self.var_decl(v)?,
            ast::Stmt::ConstDecl(c) => StmtKind::LocalConst(self.local_const(c)?),
            ast::Stmt::If(i) => StmtKind::If {
                cond: self.check(i.cond, &Type::Bool)?,
                then_branch: self.scoped(i.then_branch)?,
                else_branch: i.else_branch.map(|e| self.scoped(e)).transpose()?,
            },
            ast::Stmt::While(w) => {
                let cond = self.check(w.cond, &Type::Bool)?;
                let body = self.loop_body(w.body)?;
                StmtKind::While { cond, body }
            }
            ast::Stmt::DoWhile(d) => {
                let body = self.loop_body(d.body)?;
                let cond = self.check(d.cond, &Type::Bool)?;
                StmtKind::DoWhile { body, cond }
            }
            ast::Stmt::For(f) => self.for_stmt(f)?,
            ast::Stmt::Switch(sw) => self.switch(sw)?,
            ast::Stmt::Break(span) => {
                if self.env.jumps.is_empty() {
                    return Err(ResolveError::InvalidJump {
                        message: "break must be inside a loop or switch".into(),
                        span: *span,
                    });
                }
                StmtKind::Break
            }
            ast::Stmt::Continue(span) => {
                if !self.env.jumps.contains(&JumpTarget::Loop) {
                    return Err(ResolveError::InvalidJump {
                        message: "continue must be inside a loop".into(),
                        span: *span,
                    });
                }
                StmtKind::Continue
            }
            ast::Stmt::Return(r) => StmtKind::Return(self.return_value(r)?),
            ast::Stmt::Throw(t) => StmtKind::Throw(self.check(t.value, &Type::String)?),
        };
        Ok(Stmt::new(kind, span))
    }

    fn loop_body(&mut self, body: &ast::Stmt<'_>) -> Result<Box<Stmt>, ResolveError> {
        self.env.jumps.push(JumpTarget::Loop);
        let body = self.scoped(body);
        self.env.jumps.pop();
        body
    }

    /// Only expressions with an effect may stand alone.
    fn statement_expr(&mut self, e: &ast::Expr<'_>) -> Result<Expr, ResolveError> {
        let expr = self.infer(e)?;
        match expr.kind {
            ExprKind::Assign { .. }
            | ExprKind::IncDec { .. }
            | ExprKind::Call { .. }
            | ExprKind::DelegateCall { .. }
            | ExprKind::New(_) => Ok(expr),
            _ => Err(ResolveError::type_mismatch(
                expr.span,
                "only assignments, calls, increments, decrements and new can be used as statements",
            )),
        }
    }

    fn var_decl(&mut self, v: &VarDeclStmt<'_>) -> Result<StmtKind, ResolveError> {
        let name = v.name.name;
        let ty = self.resolve_type(&v.ty)?;
        if ty.is_void() {
            return Err(ResolveError::type_mismatch(v.ty.span, format!("variable {name} cannot be void")));
        }
        if ty.fixed_len().is_some() && v.init.is_some() {
            return Err(ResolveError::type_mismatch(
                v.span,
                format!("fixed array {name} cannot have an initializer"),
            ));
        }
        let init = v.init.map(|e| self.check(e, &ty)).transpose()?;

        let local = LocalId::from_index(self.env.locals.len());
        self.env.locals.push(LocalEntry {
            name: name.to_string(),
            ty: ty.clone(),
            span: v.name.span,
        });
        self.env
            .scope
            .declare(name, LocalBinding::Variable { id: local, ty }, v.name.span)?;
        Ok(StmtKind::Local { local, init })
    }

    fn local_const(&mut self, c: &ConstDecl<'_>) -> Result<ConstId, ResolveError> {
        let Some(method) = self.env.method else {
            return Err(ResolveError::type_mismatch(
                c.span,
                "local constants are only allowed in method bodies",
            ));
        };
        let (ty, value) = self.eval_const(c)?;
        let id = self.ctx.program.add_const(ConstEntry {
            id: ConstId(0),
            name: c.name.name.to_string(),
            owner: ConstOwner::Method(method),
            visibility: Visibility::Private,
            ty,
            value: Some(value),
            span: c.name.span,
        });
        self.env
            .scope
            .declare(c.name.name, LocalBinding::Constant(id), c.name.span)?;
        Ok(id)
    }

    fn for_stmt(&mut self, f: &ForStmt<'_>) -> Result<StmtKind, ResolveError> {
        self.env.scope.push_scope();
        let result = self.for_parts(f);
        self.env.scope.pop_scope();
        result
    }

    fn for_parts(&mut self, f: &ForStmt<'_>) -> Result<StmtKind, ResolveError> {
        let init = f.init.map(|s| self.stmt(s).map(Box::new)).transpose()?;
        let cond = f.cond.map(|c| self.check(c, &Type::Bool)).transpose()?;
        let step = f.step.map(|s| self.statement_expr(s)).transpose()?;
        let body = self.loop_body(f.body)?;
        Ok(StmtKind::For {
            init,
            cond,
            step,
            body,
        })
    }

    fn switch(&mut self, sw: &SwitchStmt<'_>) -> Result<StmtKind, ResolveError> {
        let value = self.infer(sw.value)?;
        if !(value.ty.is_integer() || matches!(value.ty, Type::Enum(_))) {
            return Err(ResolveError::type_mismatch(
                value.span,
                format!("cannot switch on a value of type {}", self.display(&value.ty)),
            ));
        }

        let mut seen: FxHashSet<i64> = FxHashSet::default();
        let mut has_default = false;
        let mut cases = Vec::with_capacity(sw.cases.len());

        self.env.jumps.push(JumpTarget::Switch);
        for case in sw.cases {
            let mut labels = Vec::with_capacity(case.labels.len());
            for label in case.labels {
                let checked = self.check(label, &value.ty)?;
                let Some(constant) = const_value(self.program(), &checked) else {
                    return Err(ResolveError::not_constant(label.span(), "case label must be constant"));
                };
                let key = constant.as_int().unwrap_or_default();
                if !seen.insert(key) {
                    return Err(ResolveError::duplicate(label.span(), format!("case {constant}")));
                }
                labels.push(constant);
            }
            if case.is_default {
                if has_default {
                    return Err(ResolveError::duplicate(case.span, "default"));
                }
                has_default = true;
            }

            self.env.scope.push_scope();
            let body = self.stmts(case.body);
            self.env.scope.pop_scope();
            cases.push(ir::SwitchCase {
                labels,
                is_default: case.is_default,
                body: body?,
                span: case.span,
            });
        }
        self.env.jumps.pop();

        Ok(StmtKind::Switch { value, cases })
    }

    fn return_value(&mut self, r: &ReturnStmt<'_>) -> Result<Option<Expr>, ResolveError> {
        let expected = self.env.return_type.clone();
        match (r.value, expected.is_void()) {
            (None, true) => Ok(None),
            (Some(value), false) => self.check(value, &expected).map(Some),
            (None, false) => Err(ResolveError::type_mismatch(
                r.span,
                format!("a value of type {} must be returned", self.display(&expected)),
            )),
            (Some(value), true) => Err(ResolveError::type_mismatch(
                value.span(),
                "a void method cannot return a value",
            )),
        }
    }
}
