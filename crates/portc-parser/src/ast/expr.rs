//! Expression nodes.

use portc_core::{AssignOp, BinaryOp, IncDecOp, Span, UnaryOp};

use super::{Ident, PrimitiveType, TypeExpr};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    Ident(Ident<'ast>),
    This(Span),
    /// `base`, only valid as the receiver of a call.
    Base(Span),
    Unary(&'ast UnaryExpr<'ast>),
    IncDec(&'ast IncDecExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    Ternary(&'ast TernaryExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    Index(&'ast IndexExpr<'ast>),
    Member(&'ast MemberExpr<'ast>),
    Cast(&'ast CastExpr<'ast>),
    New(&'ast NewExpr<'ast>),
    /// `BinaryResource("path")`
    Resource(ResourceExpr<'ast>),
    Paren(&'ast ParenExpr<'ast>),
    /// `{ a, b, c }`, only valid as a constant array initializer.
    InitList(InitListExpr<'ast>),
}

impl Expr<'_> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Ident(e) => e.span,
            Expr::This(span) | Expr::Base(span) => *span,
            Expr::Unary(e) => e.span,
            Expr::IncDec(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Ternary(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Resource(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::InitList(e) => e.span,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr<'_> {
        match self {
            Expr::Paren(p) => p.expr.unparenthesized(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Int(i64),
    /// Literal with an `f` suffix.
    Float(f64),
    Double(f64),
    Bool(bool),
    /// Decoded string contents.
    String(&'ast str),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncDecExpr<'ast> {
    pub op: IncDecOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    pub op: AssignOp,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryExpr<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub then_expr: &'ast Expr<'ast>,
    pub else_expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub member: Ident<'ast>,
    pub span: Span,
}

/// `(int) x` and friends; only primitive targets are castable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub target: PrimitiveType,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewKind<'ast> {
    /// `new Name()`
    Object(Ident<'ast>),
    /// `new T[len]`
    Array {
        elem: TypeExpr<'ast>,
        len: &'ast Expr<'ast>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub kind: NewKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceExpr<'ast> {
    pub path: &'ast str,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitListExpr<'ast> {
    pub elements: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}
