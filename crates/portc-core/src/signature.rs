//! Deterministic method signature hashes.
//!
//! A [`SignatureHash`] identifies a method by its name and parameter types
//! only, so an `override` in a derived class hashes to the same value as the
//! virtual method it replaces. Dispatch tables are keyed by it.

use std::fmt;

use num_enum::IntoPrimitive;
use xxhash_rust::xxh64::xxh64;

use crate::Type;

/// Domain marker mixed into every signature hash.
const SIGNATURE_SEED: u64 = 0x7d3c_8b4a_92e1_5f6d;

/// One-byte tag written for each type in a signature encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
enum TypeTag {
    Void = 0,
    Bool = 1,
    Byte = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    String = 7,
    Enum = 8,
    Class = 9,
    Delegate = 10,
    Array = 11,
    Pointer = 12,
    Null = 13,
}

impl TypeTag {
    fn of(ty: &Type) -> Self {
        match ty {
            Type::Void => TypeTag::Void,
            Type::Bool => TypeTag::Bool,
            Type::Byte => TypeTag::Byte,
            Type::Int => TypeTag::Int,
            Type::Long => TypeTag::Long,
            Type::Float => TypeTag::Float,
            Type::Double => TypeTag::Double,
            Type::String => TypeTag::String,
            Type::Enum(_) => TypeTag::Enum,
            Type::Class(_) => TypeTag::Class,
            Type::Delegate(_) => TypeTag::Delegate,
            Type::Array { .. } => TypeTag::Array,
            Type::Pointer { .. } => TypeTag::Pointer,
            Type::Null => TypeTag::Null,
        }
    }
}

/// Hash of a method's name and parameter types.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureHash(pub u64);

impl SignatureHash {
    pub fn of(name: &str, params: &[Type]) -> Self {
        let mut bytes = Vec::with_capacity(name.len() + 1 + params.len() * 5);
        bytes.extend_from_slice(name.as_bytes());
        // Identifier bytes are ASCII, so 0xFF cannot occur inside the name.
        bytes.push(0xFF);
        for param in params {
            encode_type(param, &mut bytes);
        }
        SignatureHash(xxh64(&bytes, SIGNATURE_SEED))
    }
}

fn encode_type(ty: &Type, out: &mut Vec<u8>) {
    out.push(TypeTag::of(ty).into());
    match ty {
        Type::Enum(id) => out.extend_from_slice(&id.0.to_le_bytes()),
        Type::Class(id) => out.extend_from_slice(&id.0.to_le_bytes()),
        Type::Delegate(id) => out.extend_from_slice(&id.0.to_le_bytes()),
        Type::Array { elem, len } => {
            out.extend_from_slice(&len.map_or(u32::MAX, |n| n).to_le_bytes());
            encode_type(elem, out);
        }
        Type::Pointer { target, readonly } => {
            out.push(u8::from(*readonly));
            encode_type(target, out);
        }
        _ => {}
    }
}

impl fmt::Debug for SignatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureHash({:#018x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassId;

    #[test]
    fn same_name_and_params_hash_equal() {
        let a = SignatureHash::of("Area", &[Type::Int]);
        let b = SignatureHash::of("Area", &[Type::Int]);
        assert_eq!(a, b);
    }

    #[test]
    fn parameter_types_distinguish_signatures() {
        let int = SignatureHash::of("f", &[Type::Int]);
        let long = SignatureHash::of("f", &[Type::Long]);
        assert_ne!(int, long);
    }

    #[test]
    fn parameter_order_matters() {
        let ab = SignatureHash::of("f", &[Type::Int, Type::Bool]);
        let ba = SignatureHash::of("f", &[Type::Bool, Type::Int]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn nested_types_are_encoded() {
        let shapes = Type::array_ref(Type::Class(ClassId(1)), false);
        let circles = Type::array_ref(Type::Class(ClassId(2)), false);
        let readonly = Type::array_ref(Type::Class(ClassId(1)), true);
        let base = SignatureHash::of("Draw", &[shapes]);
        assert_ne!(base, SignatureHash::of("Draw", &[circles]));
        assert_ne!(base, SignatureHash::of("Draw", &[readonly]));
    }
}
