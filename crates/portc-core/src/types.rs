//! The semantic type model.

use std::fmt;

use crate::{ClassId, DelegateId, EnumId};

/// A resolved type.
///
/// Arrays come in two storage flavours: a fixed-length array (`len: Some(n)`)
/// is owned storage, an open array (`len: None`) only exists behind a
/// [`Type::Pointer`] or as the result of `new T[n]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Type {
    #[default]
    Void,
    Bool,
    Byte,
    Int,
    Long,
    Float,
    Double,
    String,
    Enum(EnumId),
    Class(ClassId),
    Delegate(DelegateId),
    Array { elem: Box<Type>, len: Option<u32> },
    Pointer { target: Box<Type>, readonly: bool },
    /// The type of the `null` literal.
    Null,
}

impl Type {
    pub fn array(elem: Type, len: Option<u32>) -> Self {
        Type::Array {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn pointer(target: Type, readonly: bool) -> Self {
        Type::Pointer {
            target: Box::new(target),
            readonly,
        }
    }

    /// A pointer to an open array of `elem`.
    pub fn array_ref(elem: Type, readonly: bool) -> Self {
        Type::pointer(Type::array(elem, None), readonly)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Byte | Type::Int | Type::Long)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Type::Float | Type::Double)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub fn is_primitive(&self) -> bool {
        self.is_numeric() || matches!(self, Type::Bool)
    }

    /// Whether `null` may be stored in a location of this type.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            Type::String
                | Type::Class(_)
                | Type::Delegate(_)
                | Type::Pointer { .. }
                | Type::Array { len: None, .. }
                | Type::Null
        )
    }

    /// Element type of an array, looking through one pointer level.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array { elem, .. } => Some(elem),
            Type::Pointer { target, .. } => match target.as_ref() {
                Type::Array { elem, .. } => Some(elem),
                _ => None,
            },
            _ => None,
        }
    }

    /// Length of a fixed array.
    pub fn fixed_len(&self) -> Option<u32> {
        match self {
            Type::Array { len, .. } => *len,
            _ => None,
        }
    }

    pub fn is_readonly_pointer(&self) -> bool {
        matches!(self, Type::Pointer { readonly: true, .. })
    }

    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            Type::Class(id) => Some(*id),
            _ => None,
        }
    }

    /// Render the type using `names` for user-declared types.
    pub fn display<'a, N: TypeNames + ?Sized>(&'a self, names: &'a N) -> TypeDisplay<'a, N> {
        TypeDisplay { ty: self, names }
    }
}

/// Provides names for user-declared types when rendering a [`Type`].
pub trait TypeNames {
    fn class_name(&self, id: ClassId) -> &str;
    fn enum_name(&self, id: EnumId) -> &str;
    fn delegate_name(&self, id: DelegateId) -> &str;
}

/// Display adapter returned by [`Type::display`].
pub struct TypeDisplay<'a, N: ?Sized> {
    ty: &'a Type,
    names: &'a N,
}

impl<N: TypeNames + ?Sized> fmt::Display for TypeDisplay<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Type::Void => f.write_str("void"),
            Type::Bool => f.write_str("bool"),
            Type::Byte => f.write_str("byte"),
            Type::Int => f.write_str("int"),
            Type::Long => f.write_str("long"),
            Type::Float => f.write_str("float"),
            Type::Double => f.write_str("double"),
            Type::String => f.write_str("string"),
            Type::Null => f.write_str("null"),
            Type::Enum(id) => f.write_str(self.names.enum_name(*id)),
            Type::Class(id) => f.write_str(self.names.class_name(*id)),
            Type::Delegate(id) => f.write_str(self.names.delegate_name(*id)),
            Type::Array { elem, len } => {
                write!(f, "{}", elem.display(self.names))?;
                match len {
                    Some(n) => write!(f, "[{n}]"),
                    None => f.write_str("[]"),
                }
            }
            Type::Pointer { target, readonly } => {
                if *readonly {
                    f.write_str("const ")?;
                }
                match target.as_ref() {
                    Type::Array { .. } => write!(f, "{}", target.display(self.names)),
                    other => write!(f, "ref {}", other.display(self.names)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names;

    impl TypeNames for Names {
        fn class_name(&self, _: ClassId) -> &str {
            "Shape"
        }
        fn enum_name(&self, _: EnumId) -> &str {
            "Color"
        }
        fn delegate_name(&self, _: DelegateId) -> &str {
            "Callback"
        }
    }

    #[test]
    fn displays_arrays_and_pointers() {
        let fixed = Type::array(Type::Byte, Some(16));
        assert_eq!(fixed.display(&Names).to_string(), "byte[16]");

        let view = Type::array_ref(Type::Int, true);
        assert_eq!(view.display(&Names).to_string(), "const int[]");

        let shapes = Type::array_ref(Type::Class(ClassId(0)), false);
        assert_eq!(shapes.display(&Names).to_string(), "Shape[]");
    }

    #[test]
    fn element_type_looks_through_pointer() {
        let view = Type::array_ref(Type::Long, false);
        assert_eq!(view.element_type(), Some(&Type::Long));
        assert_eq!(Type::Int.element_type(), None);
    }

    #[test]
    fn nullable_types() {
        assert!(Type::String.is_nullable());
        assert!(Type::Class(ClassId(1)).is_nullable());
        assert!(!Type::array(Type::Int, Some(3)).is_nullable());
        assert!(!Type::Int.is_nullable());
    }
}
