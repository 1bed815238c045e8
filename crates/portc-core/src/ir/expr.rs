use crate::{
    AssignOp, BinaryOp, ClassId, ConstId, ConstValue, DelegateId, EnumId, FieldId, IncDecOp,
    LocalId, MethodId, ResourceId, Span, Type, UnaryOp,
};

/// A typed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type, span: Span) -> Self {
        Self { kind, ty, span }
    }

    pub fn literal(value: ConstValue, ty: Type, span: Span) -> Self {
        Self::new(ExprKind::Literal(value), ty, span)
    }

    /// Wrap `self` in a coercion to `ty`.
    pub fn coerce(self, kind: CoercionKind, ty: Type) -> Self {
        let span = self.span;
        Self::new(
            ExprKind::Coerce {
                expr: Box::new(self),
                kind,
            },
            ty,
            span,
        )
    }

    /// Whether this expression denotes a storage location.
    pub fn is_place(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Local(_) | ExprKind::Param(_) | ExprKind::Field { .. } | ExprKind::Index { .. }
        )
    }
}

/// How a call reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// A static method; there is no receiver.
    Static,
    /// A known method body, called directly with a receiver.
    Direct,
    /// Looked up through the receiver's dispatch table.
    Virtual,
}

/// The object a method call or method reference applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Receiver {
    /// Static methods.
    None,
    /// The current object, written or implied.
    This,
    /// The current object viewed as its base class (`base.M()`).
    Base,
    Object(Box<Expr>),
}

/// Conversions the resolver inserted implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoercionKind {
    /// Numeric widening along byte → int → long or int → float → double.
    Numeric,
    /// Derived class reference to one of its bases.
    Upcast,
    /// Writable array reference to a read-only one.
    ToReadOnly,
    /// Array storage to an array reference.
    ArrayToPointer,
    /// `null` to a reference type.
    NullToReference,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(ConstValue),
    Const(ConstId),
    EnumValue {
        enum_id: EnumId,
        index: u32,
    },
    Local(LocalId),
    Param(u32),
    This,
    Field {
        object: Box<Expr>,
        field: FieldId,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Length of a string.
    StringLength(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    IncDec {
        op: IncDecOp,
        target: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Call {
        method: MethodId,
        receiver: Receiver,
        args: Vec<Expr>,
        dispatch: Dispatch,
    },
    /// Invocation of a delegate-typed value.
    DelegateCall {
        callee: Box<Expr>,
        delegate: DelegateId,
        args: Vec<Expr>,
    },
    /// A static method used as a delegate value.
    MethodRef(MethodId),
    New(ClassId),
    NewArray {
        elem: Type,
        len: Box<Expr>,
    },
    /// Explicit primitive cast to the node's type.
    Cast(Box<Expr>),
    Coerce {
        expr: Box<Expr>,
        kind: CoercionKind,
    },
    Resource(ResourceId),
}
