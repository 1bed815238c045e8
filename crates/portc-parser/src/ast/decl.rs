//! Declaration nodes.

use portc_core::Span;

use super::{Block, Expr, Ident, Modifiers, TypeExpr};

/// A top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    Class(&'ast ClassDecl<'ast>),
    Enum(&'ast EnumDecl<'ast>),
    Delegate(&'ast DelegateDecl<'ast>),
}

impl<'ast> Item<'ast> {
    pub fn name(&self) -> Ident<'ast> {
        match self {
            Item::Class(c) => c.name,
            Item::Enum(e) => e.name,
            Item::Delegate(d) => d.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Item::Class(c) => c.span,
            Item::Enum(e) => e.span,
            Item::Delegate(d) => d.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    pub modifiers: Modifiers,
    pub name: Ident<'ast>,
    pub base: Option<Ident<'ast>>,
    pub members: &'ast [ClassMember<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassMember<'ast> {
    Field(&'ast FieldDecl<'ast>),
    Const(&'ast ConstDecl<'ast>),
    Method(&'ast MethodDecl<'ast>),
    Constructor(&'ast ConstructorDecl<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub modifiers: Modifiers,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

/// A named constant, at class level or inside a method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstDecl<'ast> {
    pub modifiers: Modifiers,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    pub modifiers: Modifiers,
    pub return_type: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    /// `None` for abstract methods.
    pub body: Option<&'ast Block<'ast>>,
    pub span: Span,
}

/// `Name() { ... }`; constructors take no parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructorDecl<'ast> {
    pub modifiers: Modifiers,
    pub name: Ident<'ast>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumDecl<'ast> {
    pub modifiers: Modifiers,
    pub name: Ident<'ast>,
    pub values: &'ast [EnumValueDecl<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumValueDecl<'ast> {
    pub name: Ident<'ast>,
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelegateDecl<'ast> {
    pub modifiers: Modifiers,
    pub return_type: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub span: Span,
}
