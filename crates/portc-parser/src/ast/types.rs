use portc_core::Span;

use super::{Expr, Ident};

/// Built-in type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Void,
    Bool,
    Byte,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Void => "void",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeBase<'ast> {
    Primitive(PrimitiveType),
    Named(Ident<'ast>),
}

/// One `[...]` suffix of a type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArraySuffix<'ast> {
    /// `T[]`, a reference to an array of unknown length.
    Open,
    /// `T[N]`, fixed-length storage.
    Fixed(&'ast Expr<'ast>),
}

/// A type as written: `const T[][N]`.
///
/// Suffixes apply left to right from the outside in, so `int[3][4]` is three
/// elements of `int[4]`. `const` makes the outermost open array read-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    pub is_const: bool,
    pub base: TypeBase<'ast>,
    pub suffixes: &'ast [ArraySuffix<'ast>],
    pub span: Span,
}

impl<'ast> TypeExpr<'ast> {
    pub fn primitive(ty: PrimitiveType, span: Span) -> Self {
        Self {
            is_const: false,
            base: TypeBase::Primitive(ty),
            suffixes: &[],
            span,
        }
    }

    pub fn is_void(&self) -> bool {
        self.suffixes.is_empty() && self.base == TypeBase::Primitive(PrimitiveType::Void)
    }
}
