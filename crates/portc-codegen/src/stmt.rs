//! Statements and method bodies.

use portc_core::ir::{Block, Expr, ExprKind, Stmt, StmtKind, SwitchCase};
use portc_core::{ConstId, ConstValue, LocalId, Type};
use portc_lowering::StorageKind;

use crate::Target;
use crate::emitter::Emitter;

/// Whether control never continues past `stmt`.
pub(crate) fn always_jumps(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Break | StmtKind::Continue | StmtKind::Return(_) | StmtKind::Throw(_) => true,
        StmtKind::Block(block) => block.stmts.iter().any(always_jumps),
        StmtKind::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => always_jumps(then_branch) && always_jumps(else_branch),
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => is_true(cond) && !breaks_out(body),
        StmtKind::For { cond, body, .. } => cond.as_ref().is_none_or(is_true) && !breaks_out(body),
        StmtKind::Switch { cases, .. } => {
            cases.iter().any(|c| c.is_default)
                && cases
                    .iter()
                    .all(|c| c.body.iter().any(always_jumps) && !c.body.iter().any(breaks_out))
        }
        _ => false,
    }
}

/// Whether `stmt` contains a `break` of the enclosing loop or switch.
fn breaks_out(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Break => true,
        StmtKind::Block(block) => block.stmts.iter().any(breaks_out),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => breaks_out(then_branch) || else_branch.as_deref().is_some_and(breaks_out),
        _ => false,
    }
}

fn is_true(cond: &Expr) -> bool {
    matches!(cond.kind, ExprKind::Literal(ConstValue::Bool(true)))
}

/// Locals and array constants of a body, in declaration order.
fn collect_declarations(stmts: &[Stmt], locals: &mut Vec<LocalId>, consts: &mut Vec<ConstId>) {
    for stmt in stmts {
        collect_in(stmt, locals, consts);
    }
}

fn collect_in(stmt: &Stmt, locals: &mut Vec<LocalId>, consts: &mut Vec<ConstId>) {
    match &stmt.kind {
        StmtKind::Local { local, .. } => locals.push(*local),
        StmtKind::LocalConst(id) => consts.push(*id),
        StmtKind::Block(block) => collect_declarations(&block.stmts, locals, consts),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_in(then_branch, locals, consts);
            if let Some(else_branch) = else_branch {
                collect_in(else_branch, locals, consts);
            }
        }
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } => collect_in(body, locals, consts),
        StmtKind::For { init, body, .. } => {
            if let Some(init) = init {
                collect_in(init, locals, consts);
            }
            collect_in(body, locals, consts);
        }
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                collect_declarations(&case.body, locals, consts);
            }
        }
        _ => {}
    }
}

impl Emitter<'_, '_> {
    /// Write `header` and the braced body of the current method.
    ///
    /// `preamble` lines are declarations written first; `prologue` lines
    /// are statements written before the body. C89 declares every local at
    /// the top of the function.
    pub fn function(&mut self, header: &str, body: Option<&Block>, preamble: &[String], prologue: &[String]) {
        self.open(header);
        for line in preamble {
            self.out.writeln(line);
        }
        if self.target == Target::C89 {
            if let Some(body) = body {
                self.hoist_declarations(body);
            }
        }
        for line in prologue {
            self.out.writeln(line);
        }
        if let Some(body) = body {
            self.stmts(&body.stmts);
        }
        self.close();
    }

    fn hoist_declarations(&mut self, body: &Block) {
        let (mut locals, mut consts) = (Vec::new(), Vec::new());
        collect_declarations(&body.stmts, &mut locals, &mut consts);
        for id in consts {
            self.local_const(id);
        }
        let Some(method) = self.current_method() else {
            return;
        };
        for local in locals {
            let ty = self.program.method(method).locals[local.index()].ty.clone();
            let name = self.local_name(local);
            let line = format!("{};", self.declaration(&ty, &name));
            self.out.writeln(&line);
        }
    }

    fn local_name(&self, local: LocalId) -> String {
        self.frame().map_or("", |f| f.local(local)).to_string()
    }

    /// Statements of a block, dropping any that cannot be reached.
    pub fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
            if always_jumps(stmt) {
                break;
            }
        }
    }

    /// The body of a compound statement, without braces.
    fn nested(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => self.stmts(&block.stmts),
            _ => self.stmt(stmt),
        }
    }

    pub fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => {
                self.out.writeln("{");
                self.out.indent();
                self.stmts(&block.stmts);
                self.close();
            }
            StmtKind::Expr(e) => {
                let line = format!("{};", self.expr(e));
                self.out.writeln(&line);
            }
            StmtKind::Local { local, init } => {
                let text = self.local_decl(*local, init.as_ref());
                if !text.is_empty() {
                    self.out.writeln(&format!("{text};"));
                }
            }
            StmtKind::LocalConst(id) => {
                if self.target != Target::C89 {
                    self.local_const(*id);
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.if_stmt(cond, then_branch, else_branch.as_deref()),
            StmtKind::While { cond, body } => {
                let header = format!("while ({})", self.expr(cond));
                self.open(&header);
                self.nested(body);
                self.close();
            }
            StmtKind::DoWhile { body, cond } => {
                self.open("do");
                self.nested(body);
                let tail = format!("}} while ({});", self.expr(cond));
                self.close_with(&tail);
            }
            StmtKind::For { init, cond, step, body } => {
                let init = init.as_deref().map(|s| self.for_init(s)).unwrap_or_default();
                let cond = cond.as_ref().map(|c| self.expr(c)).unwrap_or_default();
                let step = step.as_ref().map(|s| self.expr(s)).unwrap_or_default();
                let spaced = |s: String| if s.is_empty() { s } else { format!(" {s}") };
                let header = format!("for ({init};{};{})", spaced(cond), spaced(step));
                self.open(&header);
                self.nested(body);
                self.close();
            }
            StmtKind::Switch { value, cases } => self.switch(value, cases),
            StmtKind::Break => self.out.writeln("break;"),
            StmtKind::Continue => self.out.writeln("continue;"),
            StmtKind::Return(None) => self.out.writeln("return;"),
            StmtKind::Return(Some(value)) => {
                let line = format!("return {};", self.expr(value));
                self.out.writeln(&line);
            }
            StmtKind::Throw(message) => {
                let message = self.expr(message);
                let line = match self.target {
                    Target::C89 | Target::C99 => format!("PORTC_THROW({message});"),
                    Target::CSharp => format!("throw new System.Exception({message});"),
                    Target::Java => format!("throw new RuntimeException({message});"),
                    Target::JavaScript => format!("throw new Error({message});"),
                };
                self.out.writeln(&line);
            }
        }
    }

    fn if_stmt(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        let header = format!("if ({})", self.expr(cond));
        self.open(&header);
        self.nested(then_branch);
        let mut next = else_branch;
        while let Some(stmt) = next {
            match &stmt.kind {
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                } => {
                    let header = format!("else if ({})", self.expr(cond));
                    self.reopen(&header);
                    self.nested(then_branch);
                    next = else_branch.as_deref();
                }
                _ => {
                    self.reopen("else");
                    self.nested(stmt);
                    next = None;
                }
            }
        }
        self.close();
    }

    fn switch(&mut self, value: &Expr, cases: &[SwitchCase]) {
        let header = format!("switch ({})", self.expr(value));
        self.open(&header);
        for case in cases {
            for label in &case.labels {
                let line = format!("case {}:", self.constant(label, &value.ty));
                self.out.writeln(&line);
            }
            if case.is_default {
                self.out.writeln("default:");
            }
            self.out.indent();
            let braced = self.target == Target::C99
                && case.body.iter().any(|s| matches!(s.kind, StmtKind::Local { .. }));
            if braced {
                self.out.writeln("{");
                self.out.indent();
            }
            self.stmts(&case.body);
            if self.target == Target::CSharp && !case.body.iter().any(always_jumps) {
                self.out.writeln("break;");
            }
            if braced {
                self.close();
            }
            self.out.dedent();
        }
        self.close();
    }

    /// A local declaration without its semicolon; empty when nothing needs
    /// to be written.
    fn local_decl(&self, local: LocalId, init: Option<&Expr>) -> String {
        let Some(method) = self.current_method() else {
            return String::new();
        };
        let ty = &self.program.method(method).locals[local.index()].ty;
        let name = self.local_name(local);
        let init = init.map(|e| self.expr(e));
        let inline_array = self.lowering.layout_of(ty).kind == StorageKind::OwnedArray;
        match self.target {
            Target::C89 => match init {
                Some(init) => format!("{name} = {init}"),
                None if inline_array => format!("memset({name}, 0, sizeof({name}))"),
                None => String::new(),
            },
            Target::C99 => {
                let decl = self.declaration(ty, &name);
                match init {
                    Some(init) => format!("{decl} = {init}"),
                    None if inline_array => format!("{decl} = {{ 0 }}"),
                    None => decl,
                }
            }
            Target::CSharp | Target::Java | Target::JavaScript => {
                let decl = self.declaration(ty, &name);
                match init.or_else(|| self.fixed_array_storage(ty)) {
                    Some(init) => format!("{decl} = {init}"),
                    None => decl,
                }
            }
        }
    }

    fn for_init(&self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Local { local, init } => self.local_decl(*local, init.as_ref()),
            StmtKind::Expr(e) => self.expr(e),
            _ => String::new(),
        }
    }

    /// Declaration of a method-local array constant.
    fn local_const(&mut self, id: ConstId) {
        let entry = self.program.const_entry(id);
        let Some(ConstValue::Array(items)) = self.const_value(id) else {
            return;
        };
        let elem = entry.ty.element_type().cloned().unwrap_or_default();
        let name = self.const_array_name(id);
        let values = self.array_literal(&items, &elem);
        let line = match self.target {
            Target::C89 | Target::C99 => format!("static {} = {values};", self.const_array_decl(&entry.ty, &name)),
            Target::CSharp => format!("{} {name} = {values};", self.type_name(&entry.ty)),
            Target::Java => format!("final {} {name} = {values};", self.type_name(&entry.ty)),
            Target::JavaScript => format!("const {name} = {values};"),
        };
        self.out.writeln(&line);
    }

    /// A C declaration of a read-only array.
    pub fn const_array_decl(&self, ty: &Type, name: &str) -> String {
        let decl = self.declaration(ty, name);
        match ty.element_type() {
            Some(Type::String) => decl,
            _ => format!("const {decl}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portc_core::Span;

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt::new(kind, Span::default())
    }

    fn bool_lit(b: bool) -> Expr {
        Expr::literal(ConstValue::Bool(b), Type::Bool, Span::default())
    }

    #[test]
    fn infinite_loops_never_complete() {
        let forever = stmt(StmtKind::While {
            cond: bool_lit(true),
            body: Box::new(stmt(StmtKind::Block(Block {
                stmts: vec![],
                span: Span::default(),
            }))),
        });
        assert!(always_jumps(&forever));

        let exits = stmt(StmtKind::While {
            cond: bool_lit(true),
            body: Box::new(stmt(StmtKind::Break)),
        });
        assert!(!always_jumps(&exits));

        let conditional = stmt(StmtKind::While {
            cond: Expr::new(ExprKind::Local(LocalId(0)), Type::Bool, Span::default()),
            body: Box::new(stmt(StmtKind::Return(None))),
        });
        assert!(!always_jumps(&conditional));
    }

    #[test]
    fn if_needs_both_branches() {
        let one = stmt(StmtKind::If {
            cond: bool_lit(false),
            then_branch: Box::new(stmt(StmtKind::Return(None))),
            else_branch: None,
        });
        assert!(!always_jumps(&one));
        let both = stmt(StmtKind::If {
            cond: bool_lit(false),
            then_branch: Box::new(stmt(StmtKind::Return(None))),
            else_branch: Some(Box::new(stmt(StmtKind::Continue))),
        });
        assert!(always_jumps(&both));
    }
}
