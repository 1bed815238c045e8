//! Statement nodes.

use portc_core::Span;

use super::{ConstDecl, Expr, Ident, TypeExpr};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    Block(&'ast Block<'ast>),
    Expr(ExprStmt<'ast>),
    VarDecl(&'ast VarDeclStmt<'ast>),
    /// `const T NAME = value;` inside a method body.
    ConstDecl(&'ast ConstDecl<'ast>),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    DoWhile(&'ast DoWhileStmt<'ast>),
    For(&'ast ForStmt<'ast>),
    Switch(&'ast SwitchStmt<'ast>),
    Break(Span),
    Continue(Span),
    Return(ReturnStmt<'ast>),
    Throw(ThrowStmt<'ast>),
}

impl Stmt<'_> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::ConstDecl(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) => *span,
            Stmt::Return(s) => s.span,
            Stmt::Throw(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclStmt<'ast> {
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub then_branch: &'ast Stmt<'ast>,
    pub else_branch: Option<&'ast Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoWhileStmt<'ast> {
    pub body: &'ast Stmt<'ast>,
    pub cond: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// A variable declaration or expression statement.
    pub init: Option<&'ast Stmt<'ast>>,
    pub cond: Option<&'ast Expr<'ast>>,
    pub step: Option<&'ast Expr<'ast>>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchStmt<'ast> {
    pub value: &'ast Expr<'ast>,
    pub cases: &'ast [SwitchCase<'ast>],
    pub span: Span,
}

/// Consecutive labels and the statements following them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchCase<'ast> {
    pub labels: &'ast [&'ast Expr<'ast>],
    pub is_default: bool,
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowStmt<'ast> {
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}
