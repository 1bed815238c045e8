//! Storage layout of types.
//!
//! Targets without automatic memory management decide from the layout
//! whether a value lives inline, as inline array storage, or behind a
//! pointer.

use portc_core::Type;

/// Size of a pointer-sized slot, in bytes.
pub const WORD_SIZE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Stored inline by value.
    Value,
    /// Fixed-length array stored inline.
    OwnedArray,
    /// Stored indirectly.
    Pointer,
}

/// Storage kind plus size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    pub kind: StorageKind,
    pub size: u32,
}

impl Layout {
    pub const fn value(size: u32) -> Self {
        Self {
            kind: StorageKind::Value,
            size,
        }
    }

    pub const fn pointer() -> Self {
        Self {
            kind: StorageKind::Pointer,
            size: WORD_SIZE,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.kind != StorageKind::Pointer
    }
}

/// Layout of `ty`.
pub fn layout_of(ty: &Type) -> Layout {
    match ty {
        Type::Void => Layout::value(0),
        Type::Bool | Type::Byte => Layout::value(1),
        Type::Int | Type::Float | Type::Enum(_) => Layout::value(4),
        Type::Long | Type::Double => Layout::value(8),
        Type::Array { elem, len: Some(n) } => Layout {
            kind: StorageKind::OwnedArray,
            size: layout_of(elem).size.saturating_mul(*n),
        },
        Type::Array { len: None, .. }
        | Type::Pointer { .. }
        | Type::Class(_)
        | Type::String
        | Type::Delegate(_)
        | Type::Null => Layout::pointer(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portc_core::{ClassId, EnumId};

    #[test]
    fn primitive_sizes() {
        let sizes: Vec<u32> = [
            Type::Void,
            Type::Bool,
            Type::Byte,
            Type::Int,
            Type::Long,
            Type::Float,
            Type::Double,
            Type::Enum(EnumId(0)),
        ]
        .iter()
        .map(|t| layout_of(t).size)
        .collect();
        assert_eq!(sizes, vec![0, 1, 1, 4, 8, 4, 8, 4]);
    }

    #[test]
    fn fixed_arrays_are_owned_inline() {
        let ty = Type::array(Type::array(Type::Int, Some(4)), Some(3));
        let layout = layout_of(&ty);
        assert_eq!(layout.kind, StorageKind::OwnedArray);
        assert_eq!(layout.size, 48);
        assert!(layout.is_inline());
    }

    #[test]
    fn references_are_pointers() {
        for ty in [
            Type::array_ref(Type::Byte, true),
            Type::array(Type::Int, None),
            Type::Class(ClassId(0)),
            Type::String,
            Type::Null,
        ] {
            assert_eq!(layout_of(&ty), Layout::pointer());
        }
    }

    #[test]
    fn array_of_objects_holds_pointers() {
        let ty = Type::array(Type::Class(ClassId(1)), Some(2));
        assert_eq!(layout_of(&ty).size, 2 * WORD_SIZE);
    }
}
