//! Constant folding over [`ConstValue`]s.
//!
//! Integer arithmetic is checked against the range of the result type:
//! leaving it is `ConstantOverflow`, dividing by zero is `NotConstant`.
//! Shifts mask their count and wrap, the way the target languages do.

use portc_core::{BinaryOp, ConstValue, ResolveError, Span, Type, UnaryOp};

fn overflow(span: Span, ty: &Type) -> ResolveError {
    let name = match ty {
        Type::Byte => "byte",
        Type::Long => "long",
        _ => "int",
    };
    ResolveError::ConstantOverflow {
        message: format!("constant value is outside the range of {name}"),
        span,
    }
}

/// Check that an integer constant fits `ty`.
pub fn fit_integer(value: i64, ty: &Type, span: Span) -> Result<i64, ResolveError> {
    let fits = match ty {
        Type::Byte => (0..=i64::from(u8::MAX)).contains(&value),
        Type::Int | Type::Enum(_) => i32::try_from(value).is_ok(),
        _ => true,
    };
    if fits { Ok(value) } else { Err(overflow(span, ty)) }
}

/// Round a floating constant to the precision of `ty`.
pub fn fit_float(value: f64, ty: &Type) -> f64 {
    match ty {
        Type::Float => f64::from(value as f32),
        _ => value,
    }
}

/// Convert a constant to `ty`, as an implicit conversion or explicit cast.
///
/// Explicit casts truncate integers to the target width, the way the
/// generated code will.
pub fn convert(value: &ConstValue, to: &Type, explicit: bool, span: Span) -> Result<ConstValue, ResolveError> {
    if to.is_floating() {
        let v = value
            .as_f64()
            .ok_or_else(|| ResolveError::not_constant(span, "expected a numeric constant"))?;
        return Ok(ConstValue::float(fit_float(v, to)));
    }
    if to.is_integer() {
        let v = match value {
            ConstValue::Float(f) => {
                let f = f.0.trunc();
                if !(i64::MIN as f64..=i64::MAX as f64).contains(&f) {
                    return Err(overflow(span, to));
                }
                f as i64
            }
            other => other
                .as_int()
                .ok_or_else(|| ResolveError::not_constant(span, "expected an integer constant"))?,
        };
        let v = if explicit {
            match to {
                Type::Byte => i64::from(v as u8),
                Type::Int => i64::from(v as i32),
                _ => v,
            }
        } else {
            fit_integer(v, to, span)?
        };
        return Ok(ConstValue::Int(v));
    }
    Ok(value.clone())
}

pub fn unary(op: UnaryOp, value: &ConstValue, ty: &Type, span: Span) -> Result<ConstValue, ResolveError> {
    match (op, value) {
        (UnaryOp::Not, ConstValue::Bool(b)) => Ok(ConstValue::Bool(!b)),
        (UnaryOp::Neg, ConstValue::Float(f)) => Ok(ConstValue::float(-f.0)),
        (UnaryOp::Neg, v) => {
            let v = v.as_int().ok_or_else(|| mismatch(span))?;
            let negated = v.checked_neg().ok_or_else(|| overflow(span, ty))?;
            Ok(ConstValue::Int(fit_integer(negated, ty, span)?))
        }
        (UnaryOp::BitNot, v) => {
            let v = v.as_int().ok_or_else(|| mismatch(span))?;
            Ok(ConstValue::Int(!v))
        }
        _ => Err(mismatch(span)),
    }
}

/// Fold `left op right` whose operands were already converted to the
/// operand type `operand_ty`.
pub fn binary(
    op: BinaryOp,
    left: &ConstValue,
    right: &ConstValue,
    operand_ty: &Type,
    span: Span,
) -> Result<ConstValue, ResolveError> {
    if op.is_logical() {
        let (l, r) = bools(left, right, span)?;
        return Ok(ConstValue::Bool(if op == BinaryOp::And { l && r } else { l || r }));
    }

    if op.is_equality() || op.is_relational() {
        return compare(op, left, right, span).map(ConstValue::Bool);
    }

    if let (ConstValue::String(l), ConstValue::String(r)) = (left, right) {
        return match op {
            BinaryOp::Add => Ok(ConstValue::String(format!("{l}{r}"))),
            _ => Err(mismatch(span)),
        };
    }

    if let (ConstValue::Bool(l), ConstValue::Bool(r)) = (left, right) {
        let value = match op {
            BinaryOp::BitAnd => l & r,
            BinaryOp::BitOr => l | r,
            BinaryOp::BitXor => l ^ r,
            _ => return Err(mismatch(span)),
        };
        return Ok(ConstValue::Bool(value));
    }

    if operand_ty.is_floating() {
        let (l, r) = (
            left.as_f64().ok_or_else(|| mismatch(span))?,
            right.as_f64().ok_or_else(|| mismatch(span))?,
        );
        let value = match op {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
            _ => return Err(mismatch(span)),
        };
        return Ok(ConstValue::float(fit_float(value, operand_ty)));
    }

    let (l, r) = (
        left.as_int().ok_or_else(|| mismatch(span))?,
        right.as_int().ok_or_else(|| mismatch(span))?,
    );
    let is_long = *operand_ty == Type::Long;
    let value = match op {
        BinaryOp::Add => l.checked_add(r),
        BinaryOp::Sub => l.checked_sub(r),
        BinaryOp::Mul => l.checked_mul(r),
        BinaryOp::Div | BinaryOp::Mod => {
            if r == 0 {
                return Err(ResolveError::not_constant(span, "division by zero in constant expression"));
            }
            if op == BinaryOp::Div { l.checked_div(r) } else { l.checked_rem(r) }
        }
        BinaryOp::BitAnd => Some(l & r),
        BinaryOp::BitOr => Some(l | r),
        BinaryOp::BitXor => Some(l ^ r),
        BinaryOp::Shl if is_long => Some(l.wrapping_shl(r as u32)),
        BinaryOp::Shr if is_long => Some(l.wrapping_shr(r as u32)),
        BinaryOp::Shl => Some(i64::from((l as i32).wrapping_shl(r as u32))),
        BinaryOp::Shr => Some(i64::from((l as i32).wrapping_shr(r as u32))),
        _ => return Err(mismatch(span)),
    };
    let value = value.ok_or_else(|| overflow(span, operand_ty))?;
    Ok(ConstValue::Int(fit_integer(value, operand_ty, span)?))
}

fn compare(op: BinaryOp, left: &ConstValue, right: &ConstValue, span: Span) -> Result<bool, ResolveError> {
    let ordering = match (left, right) {
        (ConstValue::Float(_), _) | (_, ConstValue::Float(_)) => {
            let (l, r) = (
                left.as_f64().ok_or_else(|| mismatch(span))?,
                right.as_f64().ok_or_else(|| mismatch(span))?,
            );
            l.partial_cmp(&r)
        }
        (ConstValue::String(l), ConstValue::String(r)) => Some(l.cmp(r)),
        (ConstValue::Bool(l), ConstValue::Bool(r)) => Some(l.cmp(r)),
        (ConstValue::Null, ConstValue::Null) => Some(std::cmp::Ordering::Equal),
        _ => match (left.as_int(), right.as_int()) {
            (Some(l), Some(r)) => Some(l.cmp(&r)),
            _ => return Err(mismatch(span)),
        },
    };
    // NaN compares unequal to everything.
    let Some(ordering) = ordering else {
        return Ok(op == BinaryOp::Ne);
    };
    Ok(match op {
        BinaryOp::Eq => ordering.is_eq(),
        BinaryOp::Ne => ordering.is_ne(),
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => return Err(mismatch(span)),
    })
}

fn bools(left: &ConstValue, right: &ConstValue, span: Span) -> Result<(bool, bool), ResolveError> {
    match (left.as_bool(), right.as_bool()) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(mismatch(span)),
    }
}

fn mismatch(span: Span) -> ResolveError {
    ResolveError::type_mismatch(span, "invalid operands in constant expression")
}

#[cfg(test)]
mod tests {
    use portc_core::ResolveErrorKind;

    use super::*;

    const SPAN: Span = Span {
        source: portc_core::SourceId(0),
        line: 1,
        col: 1,
        len: 1,
        expansion: None,
    };

    fn int(v: i64) -> ConstValue {
        ConstValue::Int(v)
    }

    #[test]
    fn int_arithmetic_is_range_checked() {
        assert_eq!(binary(BinaryOp::Add, &int(2), &int(3), &Type::Int, SPAN), Ok(int(5)));
        let err = binary(BinaryOp::Mul, &int(1 << 20), &int(1 << 20), &Type::Int, SPAN).unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::ConstantOverflow);
        assert_eq!(
            binary(BinaryOp::Mul, &int(1 << 20), &int(1 << 20), &Type::Long, SPAN),
            Ok(int(1 << 40))
        );
    }

    #[test]
    fn division_by_zero_is_not_constant() {
        let err = binary(BinaryOp::Div, &int(1), &int(0), &Type::Int, SPAN).unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::NotConstant);
    }

    #[test]
    fn shifts_wrap_like_targets() {
        assert_eq!(
            binary(BinaryOp::Shl, &int(1), &int(31), &Type::Int, SPAN),
            Ok(int(i64::from(i32::MIN)))
        );
        assert_eq!(binary(BinaryOp::Shr, &int(-8), &int(1), &Type::Int, SPAN), Ok(int(-4)));
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(
            binary(BinaryOp::Lt, &int(1), &ConstValue::float(1.5), &Type::Double, SPAN),
            Ok(ConstValue::Bool(true))
        );
        assert_eq!(
            binary(
                BinaryOp::And,
                &ConstValue::Bool(true),
                &ConstValue::Bool(false),
                &Type::Bool,
                SPAN
            ),
            Ok(ConstValue::Bool(false))
        );
        assert_eq!(
            binary(
                BinaryOp::Add,
                &ConstValue::String("ab".into()),
                &ConstValue::String("cd".into()),
                &Type::String,
                SPAN
            ),
            Ok(ConstValue::String("abcd".into()))
        );
    }

    #[test]
    fn explicit_casts_truncate() {
        assert_eq!(convert(&int(300), &Type::Byte, true, SPAN), Ok(int(44)));
        assert_eq!(convert(&ConstValue::float(-2.7), &Type::Int, true, SPAN), Ok(int(-2)));
        assert!(convert(&int(300), &Type::Byte, false, SPAN).is_err());
        assert_eq!(
            convert(&int(3), &Type::Float, false, SPAN),
            Ok(ConstValue::float(3.0))
        );
    }

    #[test]
    fn negation_overflow() {
        let err = unary(UnaryOp::Neg, &int(i64::MIN), &Type::Long, SPAN).unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::ConstantOverflow);
        assert_eq!(unary(UnaryOp::BitNot, &int(0), &Type::Int, SPAN), Ok(int(-1)));
    }
}
