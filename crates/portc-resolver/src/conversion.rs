//! Implicit and explicit conversions.
//!
//! Implicit conversions carry a cost used to rank overloads: each step of
//! the numeric lattice
//!
//! ```text
//! byte -> int -> long
//!         int -> float -> double
//! ```
//!
//! costs 1, as does each inheritance level of an upcast and each reference
//! adjustment (`null` to a reference, read-write to read-only, fixed array
//! to array reference).

use portc_core::ir::CoercionKind;
use portc_core::{ConstValue, Type};
use portc_registry::Program;

/// An applicable implicit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    /// `None` for the identity conversion.
    pub kind: Option<CoercionKind>,
    pub cost: u32,
}

impl Conversion {
    pub const IDENTITY: Conversion = Conversion { kind: None, cost: 0 };

    fn new(kind: CoercionKind, cost: u32) -> Self {
        Self {
            kind: Some(kind),
            cost,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.kind.is_none()
    }
}

/// Number of lattice steps from `from` to `to`, if `to` is reachable.
pub fn numeric_steps(from: &Type, to: &Type) -> Option<u32> {
    let steps = match (from, to) {
        (a, b) if a == b && a.is_numeric() => 0,
        (Type::Byte, Type::Int) => 1,
        (Type::Byte, Type::Long) => 2,
        (Type::Byte, Type::Float) => 2,
        (Type::Byte, Type::Double) => 3,
        (Type::Int, Type::Long) => 1,
        (Type::Int, Type::Float) => 1,
        (Type::Int, Type::Double) => 2,
        (Type::Float, Type::Double) => 1,
        _ => return None,
    };
    Some(steps)
}

/// Find the implicit conversion from `from` to `to`.
///
/// `constant` is the folded value of the source expression, if any; integer
/// constants that fit convert to `byte`.
pub fn find_implicit(
    program: &Program,
    from: &Type,
    to: &Type,
    constant: Option<&ConstValue>,
) -> Option<Conversion> {
    if from == to {
        return Some(Conversion::IDENTITY);
    }

    if let Some(steps) = numeric_steps(from, to) {
        return Some(Conversion::new(CoercionKind::Numeric, steps));
    }

    if *to == Type::Byte && from.is_integer() {
        let value = constant.and_then(ConstValue::as_int)?;
        return (0..=255).contains(&value).then(|| Conversion::new(CoercionKind::Numeric, 1));
    }

    match (from, to) {
        (Type::Null, to) if to.is_nullable() => Some(Conversion::new(CoercionKind::NullToReference, 1)),

        (Type::Class(derived), Type::Class(base)) => program
            .inheritance_distance(*derived, *base)
            .map(|distance| Conversion::new(CoercionKind::Upcast, distance)),

        (
            Type::Pointer {
                target: from_target,
                readonly: false,
            },
            Type::Pointer {
                target: to_target,
                readonly: true,
            },
        ) if from_target == to_target => Some(Conversion::new(CoercionKind::ToReadOnly, 1)),

        (Type::Array { elem: from_elem, .. }, Type::Pointer { target, .. }) => match target.as_ref() {
            Type::Array {
                elem: to_elem,
                len: None,
            } if from_elem == to_elem => Some(Conversion::new(CoercionKind::ArrayToPointer, 1)),
            _ => None,
        },

        _ => None,
    }
}

/// Whether `(to) expr` is a valid explicit cast from `from`.
pub fn is_valid_cast(from: &Type, to: &Type) -> bool {
    match to {
        t if t.is_numeric() => from.is_numeric() || matches!(from, Type::Enum(_)),
        Type::Bool => *from == Type::Bool,
        Type::String => *from == Type::String,
        _ => false,
    }
}

/// The arithmetic type both operands convert to: the first of
/// `int, long, float, double` reachable from each.
pub fn common_numeric(left: &Type, right: &Type) -> Option<Type> {
    [Type::Int, Type::Long, Type::Float, Type::Double]
        .into_iter()
        .find(|candidate| numeric_steps(left, candidate).is_some() && numeric_steps(right, candidate).is_some())
}

/// Integer promotion for unary operators and shifts: `byte` becomes `int`.
pub fn promote_integer(ty: &Type) -> Option<Type> {
    match ty {
        Type::Byte | Type::Int => Some(Type::Int),
        Type::Long => Some(Type::Long),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use portc_core::{ClassId, Span};

    use super::*;

    fn program_with_chain() -> Program {
        let mut program = Program::new();
        let a = program.register_class("A", Span::default()).unwrap();
        let b = program.register_class("B", Span::default()).unwrap();
        let c = program.register_class("C", Span::default()).unwrap();
        program.class_mut(b).base = Some(a);
        program.class_mut(c).base = Some(b);
        program.link_hierarchy().unwrap();
        program
    }

    #[test]
    fn numeric_lattice_costs() {
        assert_eq!(numeric_steps(&Type::Byte, &Type::Double), Some(3));
        assert_eq!(numeric_steps(&Type::Int, &Type::Long), Some(1));
        assert_eq!(numeric_steps(&Type::Long, &Type::Float), None);
        assert_eq!(numeric_steps(&Type::Long, &Type::Int), None);
        assert_eq!(numeric_steps(&Type::Double, &Type::Float), None);
    }

    #[test]
    fn constant_ints_fit_into_byte() {
        let program = Program::new();
        let fits = ConstValue::Int(200);
        let too_big = ConstValue::Int(256);
        assert_eq!(
            find_implicit(&program, &Type::Int, &Type::Byte, Some(&fits)).map(|c| c.cost),
            Some(1)
        );
        assert!(find_implicit(&program, &Type::Int, &Type::Byte, Some(&too_big)).is_none());
        assert!(find_implicit(&program, &Type::Int, &Type::Byte, None).is_none());
    }

    #[test]
    fn upcast_cost_is_distance() {
        let program = program_with_chain();
        let conversion = find_implicit(&program, &Type::Class(ClassId(2)), &Type::Class(ClassId(0)), None).unwrap();
        assert_eq!(conversion.kind, Some(CoercionKind::Upcast));
        assert_eq!(conversion.cost, 2);
        assert!(find_implicit(&program, &Type::Class(ClassId(0)), &Type::Class(ClassId(2)), None).is_none());
    }

    #[test]
    fn reference_adjustments() {
        let program = Program::new();
        let rw = Type::array_ref(Type::Int, false);
        let ro = Type::array_ref(Type::Int, true);
        let fixed = Type::array(Type::Int, Some(4));
        assert_eq!(
            find_implicit(&program, &rw, &ro, None).and_then(|c| c.kind),
            Some(CoercionKind::ToReadOnly)
        );
        assert!(find_implicit(&program, &ro, &rw, None).is_none());
        assert_eq!(
            find_implicit(&program, &fixed, &rw, None).and_then(|c| c.kind),
            Some(CoercionKind::ArrayToPointer)
        );
        assert!(find_implicit(&program, &fixed, &Type::array_ref(Type::Long, false), None).is_none());
        assert_eq!(
            find_implicit(&program, &Type::Null, &Type::String, None).and_then(|c| c.kind),
            Some(CoercionKind::NullToReference)
        );
    }

    #[test]
    fn common_type_prefers_narrowest() {
        assert_eq!(common_numeric(&Type::Byte, &Type::Byte), Some(Type::Int));
        assert_eq!(common_numeric(&Type::Int, &Type::Float), Some(Type::Float));
        assert_eq!(common_numeric(&Type::Long, &Type::Int), Some(Type::Long));
        assert_eq!(common_numeric(&Type::Long, &Type::Float), None);
    }

    #[test]
    fn casts() {
        assert!(is_valid_cast(&Type::Double, &Type::Byte));
        assert!(is_valid_cast(&Type::Enum(portc_core::EnumId(0)), &Type::Int));
        assert!(!is_valid_cast(&Type::Int, &Type::Bool));
        assert!(!is_valid_cast(&Type::String, &Type::Int));
    }
}
