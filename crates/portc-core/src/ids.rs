//! Typed indices into the symbol model.
//!
//! Every entity the resolver registers gets a dense `u32` index; the newtypes
//! keep a class index from being used where a method index is expected.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// A class declaration.
    ClassId,
    "class"
);
define_id!(
    /// An enum declaration.
    EnumId,
    "enum"
);
define_id!(
    /// A delegate declaration.
    DelegateId,
    "delegate"
);
define_id!(
    /// A method or constructor.
    MethodId,
    "method"
);
define_id!(
    /// A class field.
    FieldId,
    "field"
);
define_id!(
    /// A named constant, either class-level or method-local.
    ConstId,
    "const"
);
define_id!(
    /// A local variable slot within one method.
    LocalId,
    "local"
);
define_id!(
    /// A binary resource path referenced from source.
    ResourceId,
    "resource"
);

/// A reference to any resolved symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolRef {
    Class(ClassId),
    Enum(EnumId),
    /// The `index`th value of an enum, in declaration order.
    EnumValue(EnumId, u32),
    Delegate(DelegateId),
    Field(FieldId),
    Const(ConstId),
    Method(MethodId),
    /// The `index`th parameter of a method.
    Parameter(MethodId, u32),
    Local(MethodId, LocalId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_indices() {
        assert_eq!(ClassId::from_index(3).index(), 3);
        assert_eq!(format!("{:?}", MethodId(7)), "method#7");
    }
}
