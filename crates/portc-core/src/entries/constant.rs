use crate::{ClassId, ConstId, ConstValue, MethodId, Span, Type, Visibility};

/// Where a named constant was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstOwner {
    Class(ClassId),
    /// A `const` local inside a method body.
    Method(MethodId),
}

/// A named compile-time constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstEntry {
    pub id: ConstId,
    pub name: String,
    pub owner: ConstOwner,
    pub visibility: Visibility,
    pub ty: Type,
    /// Folded value; filled in once the initializer has been evaluated.
    pub value: Option<ConstValue>,
    pub span: Span,
}
