//! Unary, binary, assignment and increment operators.
//!
//! Arithmetic operands are converted to their least common numeric type
//! (at least `int`); `long` mixed with `float` has none. Shift counts are
//! `int` and the result has the promoted type of the left operand. String
//! concatenation only exists between constants.

use portc_core::ir::{Expr, ExprKind};
use portc_core::{BinaryOp, ConstValue, ResolveError, Span, Type, UnaryOp};
use portc_parser::ast::{self, AssignExpr, BinaryExpr, IncDecExpr, LiteralKind, UnaryExpr};

use super::expr::int_literal_type;
use super::{Checker, const_value};
use crate::conversion::{common_numeric, find_implicit, promote_integer};
use crate::fold;

/// Operand and result types chosen for a binary operator.
struct BinaryTypes {
    left: Type,
    right: Type,
    result: Type,
}

impl BinaryTypes {
    fn uniform(operand: Type, result: Type) -> Self {
        Self {
            left: operand.clone(),
            right: operand,
            result,
        }
    }
}

impl Checker<'_, '_> {
    pub(crate) fn unary(&mut self, u: &UnaryExpr<'_>) -> Result<Expr, ResolveError> {
        // `-2147483648` is an int even though `2147483648` alone is a long.
        if u.op == UnaryOp::Neg {
            if let ast::Expr::Literal(lit) = u.operand.unparenthesized() {
                if let LiteralKind::Int(v) = lit.kind {
                    let negated = -v;
                    return Ok(Expr::literal(ConstValue::Int(negated), int_literal_type(negated), u.span));
                }
            }
        }

        let operand = self.infer(u.operand)?;
        let ty = match u.op {
            UnaryOp::Not if operand.ty == Type::Bool => Some(Type::Bool),
            UnaryOp::Neg if operand.ty.is_floating() => Some(operand.ty.clone()),
            UnaryOp::Neg | UnaryOp::BitNot => promote_integer(&operand.ty),
            UnaryOp::Not => None,
        };
        let Some(ty) = ty else {
            return Err(ResolveError::type_mismatch(
                u.span,
                format!(
                    "operator {} cannot be applied to {}",
                    u.op.as_str(),
                    self.display(&operand.ty)
                ),
            ));
        };

        let operand = self.coerce_to(operand, &ty)?;
        if let Some(value) = const_value(self.program(), &operand) {
            let folded = fold::unary(u.op, &value, &ty, u.span)?;
            return Ok(Expr::literal(folded, ty, u.span));
        }
        Ok(Expr::new(
            ExprKind::Unary {
                op: u.op,
                operand: Box::new(operand),
            },
            ty,
            u.span,
        ))
    }

    pub(crate) fn binary(&mut self, b: &BinaryExpr<'_>) -> Result<Expr, ResolveError> {
        let left = self.infer(b.left)?;
        let right = self.infer(b.right)?;
        let types = self.binary_types(b.op, &left, &right, b.span)?;

        let left = self.coerce_to(left, &types.left)?;
        let right = self.coerce_to(right, &types.right)?;

        let program = self.program();
        if let (Some(l), Some(r)) = (const_value(program, &left), const_value(program, &right)) {
            let folded = fold::binary(b.op, &l, &r, &types.left, b.span)?;
            return Ok(Expr::literal(folded, types.result, b.span));
        }
        Ok(Expr::new(
            ExprKind::Binary {
                op: b.op,
                left: Box::new(left),
                right: Box::new(right),
            },
            types.result,
            b.span,
        ))
    }

    fn binary_types(&self, op: BinaryOp, left: &Expr, right: &Expr, span: Span) -> Result<BinaryTypes, ResolveError> {
        let (l, r) = (&left.ty, &right.ty);
        let mismatch = || {
            ResolveError::type_mismatch(
                span,
                format!(
                    "operator {} cannot be applied to {} and {}",
                    op.as_str(),
                    self.display(l),
                    self.display(r)
                ),
            )
        };

        if op.is_logical() {
            return if *l == Type::Bool && *r == Type::Bool {
                Ok(BinaryTypes::uniform(Type::Bool, Type::Bool))
            } else {
                Err(mismatch())
            };
        }

        if op.is_shift() {
            let promoted = promote_integer(l).ok_or_else(mismatch)?;
            if !r.is_integer() {
                return Err(mismatch());
            }
            return Ok(BinaryTypes {
                left: promoted.clone(),
                right: Type::Int,
                result: promoted,
            });
        }

        if op.is_arithmetic() {
            if op == BinaryOp::Add && *l == Type::String && *r == Type::String {
                let program = self.program();
                if const_value(program, left).is_none() || const_value(program, right).is_none() {
                    return Err(ResolveError::type_mismatch(
                        span,
                        "strings can only be concatenated in constant expressions",
                    ));
                }
                return Ok(BinaryTypes::uniform(Type::String, Type::String));
            }
            let common = common_numeric(l, r).ok_or_else(mismatch)?;
            if op == BinaryOp::Mod && common.is_floating() {
                return Err(ResolveError::type_mismatch(
                    span,
                    "operator % is not defined for floating-point operands",
                ));
            }
            return Ok(BinaryTypes::uniform(common.clone(), common));
        }

        if op.is_bitwise() {
            if *l == Type::Bool && *r == Type::Bool {
                return Ok(BinaryTypes::uniform(Type::Bool, Type::Bool));
            }
            if l.is_integer() && r.is_integer() {
                let common = common_numeric(l, r).ok_or_else(mismatch)?;
                return Ok(BinaryTypes::uniform(common.clone(), common));
            }
            return Err(mismatch());
        }

        if op.is_relational() {
            if let Some(common) = common_numeric(l, r) {
                return Ok(BinaryTypes::uniform(common, Type::Bool));
            }
            if matches!(l, Type::Enum(_)) && l == r {
                return Ok(BinaryTypes::uniform(l.clone(), Type::Bool));
            }
            return Err(mismatch());
        }

        // Equality.
        if matches!(l, Type::Array { len: Some(_), .. }) || matches!(r, Type::Array { len: Some(_), .. }) {
            return Err(mismatch());
        }
        if let Some(common) = common_numeric(l, r) {
            return Ok(BinaryTypes::uniform(common, Type::Bool));
        }
        if l == r {
            return Ok(BinaryTypes::uniform(l.clone(), Type::Bool));
        }
        let program = self.program();
        if find_implicit(program, l, r, const_value(program, left).as_ref()).is_some() {
            return Ok(BinaryTypes::uniform(r.clone(), Type::Bool));
        }
        if find_implicit(program, r, l, const_value(program, right).as_ref()).is_some() {
            return Ok(BinaryTypes::uniform(l.clone(), Type::Bool));
        }
        if let (Type::Class(a), Type::Class(b)) = (l, r) {
            if let Some(common) = program.common_ancestor(*a, *b) {
                return Ok(BinaryTypes::uniform(Type::Class(common), Type::Bool));
            }
        }
        Err(mismatch())
    }

    pub(crate) fn assign(&mut self, a: &AssignExpr<'_>) -> Result<Expr, ResolveError> {
        let target = self.infer(a.target)?;
        self.check_writable(&target)?;

        let value = match a.op.binary_op() {
            None => self.check(a.value, &target.ty)?,
            Some(op) => {
                let value = self.infer(a.value)?;
                self.compound_value(op, &target, value, a.span)?
            }
        };

        let ty = target.ty.clone();
        Ok(Expr::new(
            ExprKind::Assign {
                op: a.op,
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
            a.span,
        ))
    }

    /// Right-hand side of `target op= value`.
    ///
    /// The value converts implicitly to the target's type; shift counts
    /// convert to `int`.
    fn compound_value(&self, op: BinaryOp, target: &Expr, value: Expr, span: Span) -> Result<Expr, ResolveError> {
        let ty = &target.ty;
        let valid = if op.is_shift() {
            ty.is_integer()
        } else if op.is_arithmetic() {
            ty.is_numeric() && !(op == BinaryOp::Mod && ty.is_floating())
        } else {
            ty.is_integer() || *ty == Type::Bool
        };
        if !valid {
            return Err(ResolveError::type_mismatch(
                span,
                format!("operator {}= cannot be applied to {}", op.as_str(), self.display(ty)),
            ));
        }
        if op.is_shift() {
            if !value.ty.is_integer() {
                return Err(ResolveError::type_mismatch(value.span, "shift count must be an integer"));
            }
            return self.coerce_to(value, &Type::Int);
        }
        self.coerce_to(value, ty)
    }

    pub(crate) fn inc_dec(&mut self, i: &IncDecExpr<'_>) -> Result<Expr, ResolveError> {
        let target = self.infer(i.operand)?;
        self.check_writable(&target)?;
        if !target.ty.is_numeric() {
            return Err(ResolveError::type_mismatch(
                i.span,
                format!(
                    "operator {} cannot be applied to {}",
                    i.op.as_str(),
                    self.display(&target.ty)
                ),
            ));
        }
        let ty = target.ty.clone();
        Ok(Expr::new(
            ExprKind::IncDec {
                op: i.op,
                target: Box::new(target),
            },
            ty,
            i.span,
        ))
    }

    /// Whether `target` may be assigned.
    fn check_writable(&self, target: &Expr) -> Result<(), ResolveError> {
        match &target.kind {
            ExprKind::Local(_) | ExprKind::Param(_) | ExprKind::Field { .. } => {
                if target.ty.fixed_len().is_some() {
                    return Err(ResolveError::type_mismatch(target.span, "cannot assign to a fixed array"));
                }
                Ok(())
            }
            ExprKind::Index { object, .. } => {
                if object.ty.is_readonly_pointer() || is_constant_root(object) {
                    return Err(ResolveError::type_mismatch(
                        target.span,
                        "cannot modify an element of a read-only array",
                    ));
                }
                Ok(())
            }
            ExprKind::Const(id) => Err(ResolveError::type_mismatch(
                target.span,
                format!("cannot assign to constant {}", self.program().const_entry(*id).name),
            )),
            _ => Err(ResolveError::type_mismatch(
                target.span,
                "only variables, fields and array elements can be assigned",
            )),
        }
    }
}

/// Whether an indexed expression ultimately reads from a named constant.
fn is_constant_root(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Const(_) => true,
        ExprKind::Index { object, .. } => is_constant_root(object),
        _ => false,
    }
}
