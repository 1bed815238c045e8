//! Expressions.
//!
//! Every expression renders to a string together with the precedence of
//! its outermost operator; operands are parenthesized when they bind
//! looser than their position requires.

use portc_core::ir::{CoercionKind, Dispatch, Expr, ExprKind, Receiver};
use portc_core::{AssignOp, BinaryOp, ClassId, ConstValue, MethodId, Type, UnaryOp};

use crate::Target;
use crate::emitter::Emitter;

pub(crate) const ASSIGN: u8 = 1;
pub(crate) const CONDITIONAL: u8 = 2;
pub(crate) const UNARY: u8 = 13;
pub(crate) const POSTFIX: u8 = 14;
pub(crate) const PRIMARY: u8 = 15;

fn binary_precedence(op: BinaryOp) -> u8 {
    op.precedence() + 2
}

/// Whether `expr` is the `null` literal, possibly converted.
fn is_null(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(ConstValue::Null) => true,
        ExprKind::Coerce { expr, .. } => is_null(expr),
        _ => false,
    }
}

impl Emitter<'_, '_> {
    pub fn expr(&self, e: &Expr) -> String {
        self.expr_at(e, 0)
    }

    /// `e`, parenthesized if it binds looser than `min`.
    pub fn expr_at(&self, e: &Expr, min: u8) -> String {
        let (text, precedence) = self.expr_prec(e);
        if precedence < min {
            format!("({text})")
        } else {
            text
        }
    }

    fn expr_prec(&self, e: &Expr) -> (String, u8) {
        match &e.kind {
            ExprKind::Literal(value) => self.literal(value, &e.ty),
            ExprKind::Const(id) => {
                let entry = self.program.const_entry(*id);
                match self.const_value(*id) {
                    Some(ConstValue::Array(_)) | None => (self.const_array_name(*id), PRIMARY),
                    Some(value) => self.literal(&value, &entry.ty),
                }
            }
            ExprKind::EnumValue { enum_id, index } => (self.enum_member(*enum_id, *index), PRIMARY),
            ExprKind::Local(id) => (self.frame().map_or("", |f| f.local(*id)).to_string(), PRIMARY),
            ExprKind::Param(index) => (self.frame().map_or("", |f| f.param(*index)).to_string(), PRIMARY),
            ExprKind::This => (self.this().to_string(), PRIMARY),
            ExprKind::Field { object, field } => {
                let name = self.names.ident(&self.program.field(*field).name);
                let arrow = if self.target.is_c() { "->" } else { "." };
                (format!("{}{arrow}{name}", self.expr_at(object, POSTFIX)), POSTFIX)
            }
            ExprKind::Index { object, index } => (
                format!("{}[{}]", self.expr_at(object, POSTFIX), self.expr(index)),
                POSTFIX,
            ),
            ExprKind::StringLength(s) => match self.target {
                Target::C89 | Target::C99 => (format!("(int) strlen({})", self.expr_at(s, ASSIGN)), UNARY),
                Target::CSharp => (format!("{}.Length", self.expr_at(s, POSTFIX)), POSTFIX),
                Target::Java => (format!("{}.length()", self.expr_at(s, POSTFIX)), POSTFIX),
                Target::JavaScript => (format!("{}.length", self.expr_at(s, POSTFIX)), POSTFIX),
            },
            ExprKind::Unary { op, operand } => {
                let mut inner = self.expr_at(operand, UNARY);
                if *op == UnaryOp::Neg && inner.starts_with('-') {
                    inner = format!("({inner})");
                }
                (format!("{}{inner}", op.as_str()), UNARY)
            }
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right, &e.ty),
            ExprKind::Assign { op, target, value } => self.assign(*op, target, value),
            ExprKind::IncDec { op, target } => {
                if op.is_prefix() {
                    (format!("{}{}", op.as_str(), self.expr_at(target, UNARY)), UNARY)
                } else {
                    (format!("{}{}", self.expr_at(target, POSTFIX), op.as_str()), POSTFIX)
                }
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => (
                format!(
                    "{} ? {} : {}",
                    self.expr_at(cond, CONDITIONAL + 1),
                    self.expr_at(then_expr, CONDITIONAL + 1),
                    self.expr_at(else_expr, CONDITIONAL)
                ),
                CONDITIONAL,
            ),
            ExprKind::Call {
                method,
                receiver,
                args,
                dispatch,
            } => self.call(*method, receiver, args, *dispatch),
            ExprKind::DelegateCall { callee, args, .. } => {
                let args = self.args(args);
                let callee = self.expr_at(callee, POSTFIX);
                match self.target {
                    Target::Java => (format!("{callee}.invoke({args})"), POSTFIX),
                    _ => (format!("{callee}({args})"), POSTFIX),
                }
            }
            ExprKind::MethodRef(method) => (self.method_ref(*method), PRIMARY),
            ExprKind::New(class) => match self.target {
                Target::C89 | Target::C99 => (format!("{}_New()", self.class_name(*class)), POSTFIX),
                _ => (format!("new {}()", self.class_name(*class)), UNARY),
            },
            ExprKind::NewArray { elem, len } => (self.new_array(elem, &self.expr(len)), UNARY),
            ExprKind::Cast(inner) => self.cast(inner, &e.ty),
            ExprKind::Coerce { expr, kind } => self.coerce(expr, *kind, &e.ty),
            ExprKind::Resource(id) => (self.resource_name(*id), POSTFIX),
        }
    }

    fn this(&self) -> &'static str {
        if self.target.is_c() { "self" } else { "this" }
    }

    fn literal(&self, value: &ConstValue, ty: &Type) -> (String, u8) {
        let text = self.constant(value, ty);
        // Negative numbers and casts such as `(byte) 200` or `(E) 7`.
        let is_cast = text.starts_with('(') && !text.ends_with(')');
        let precedence = if text.starts_with('-') || is_cast { UNARY } else { PRIMARY };
        (text, precedence)
    }

    fn args(&self, args: &[Expr]) -> String {
        args.iter()
            .map(|a| self.expr_at(a, ASSIGN))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    fn binary(&self, op: BinaryOp, left: &Expr, right: &Expr, ty: &Type) -> (String, u8) {
        let precedence = binary_precedence(op);
        if op.is_equality() && left.ty == Type::String && !is_null(left) && !is_null(right) {
            match self.target {
                Target::C89 | Target::C99 => {
                    return (
                        format!(
                            "strcmp({}, {}) {} 0",
                            self.expr_at(left, ASSIGN),
                            self.expr_at(right, ASSIGN),
                            op.as_str()
                        ),
                        precedence,
                    );
                }
                Target::Java => {
                    let call = format!(
                        "java.util.Objects.equals({}, {})",
                        self.expr_at(left, ASSIGN),
                        self.expr_at(right, ASSIGN)
                    );
                    return if op == BinaryOp::Eq {
                        (call, POSTFIX)
                    } else {
                        (format!("!{call}"), UNARY)
                    };
                }
                Target::CSharp | Target::JavaScript => {}
            }
        }

        let l = self.expr_at(left, precedence);
        let r = self.expr_at(right, precedence + 1);
        if self.target == Target::JavaScript {
            match (op, ty) {
                (BinaryOp::Div, Type::Int) => {
                    return (format!("{l} / {r} | 0"), binary_precedence(BinaryOp::BitOr));
                }
                (BinaryOp::Div, Type::Long) => return (format!("Math.trunc({l} / {r})"), POSTFIX),
                (BinaryOp::Mul, Type::Int) => {
                    return (
                        format!("Math.imul({}, {})", self.expr_at(left, ASSIGN), self.expr_at(right, ASSIGN)),
                        POSTFIX,
                    );
                }
                (BinaryOp::Eq, _) => return (format!("{l} === {r}"), precedence),
                (BinaryOp::Ne, _) => return (format!("{l} !== {r}"), precedence),
                (_, Type::Bool) if op.is_bitwise() => return (format!("!!({l} {op} {r})"), UNARY),
                _ => {}
            }
        }
        (format!("{l} {op} {r}"), precedence)
    }

    fn assign(&self, op: AssignOp, target: &Expr, value: &Expr) -> (String, u8) {
        let t = self.expr_at(target, UNARY);
        if self.target == Target::JavaScript {
            if let Some(bop) = op.binary_op() {
                let v = self.expr_at(value, binary_precedence(bop) + 1);
                let rewritten = match (bop, &target.ty) {
                    (BinaryOp::Div, Type::Int) => Some(format!("{t} = {t} / {v} | 0")),
                    (BinaryOp::Div, Type::Long) => Some(format!("{t} = Math.trunc({t} / {v})")),
                    (BinaryOp::Mul, Type::Int) => {
                        Some(format!("{t} = Math.imul({t}, {})", self.expr_at(value, ASSIGN)))
                    }
                    (_, Type::Bool) if bop.is_bitwise() => Some(format!("{t} = !!({t} {bop} {v})")),
                    _ => None,
                };
                if let Some(text) = rewritten {
                    return (text, ASSIGN);
                }
            }
        }
        (format!("{t} {op} {}", self.expr_at(value, ASSIGN)), ASSIGN)
    }

    // ==========================================================================
    // Conversions
    // ==========================================================================

    fn cast(&self, inner: &Expr, to: &Type) -> (String, u8) {
        let from = &inner.ty;
        match self.target {
            Target::JavaScript => self.js_cast(inner, from, to),
            Target::Java if *from == Type::Byte && *to != Type::Byte => {
                let widened = self.byte_to_int(inner);
                if *to == Type::Int || matches!(to, Type::Enum(_)) {
                    (widened, PRIMARY)
                } else {
                    (format!("({}) {widened}", self.type_name(to)), UNARY)
                }
            }
            _ => (format!("({}) {}", self.type_name(to), self.expr_at(inner, UNARY)), UNARY),
        }
    }

    fn js_cast(&self, inner: &Expr, from: &Type, to: &Type) -> (String, u8) {
        let bit_or = binary_precedence(BinaryOp::BitOr);
        let bit_and = binary_precedence(BinaryOp::BitAnd);
        match to {
            Type::Int | Type::Enum(_) if from.is_floating() || *from == Type::Long => {
                (format!("{} | 0", self.expr_at(inner, bit_or)), bit_or)
            }
            Type::Byte if *from != Type::Byte => (format!("{} & 0xff", self.expr_at(inner, bit_and)), bit_and),
            Type::Long if from.is_floating() => (format!("Math.trunc({})", self.expr_at(inner, ASSIGN)), POSTFIX),
            Type::Float if *from != Type::Float => (format!("Math.fround({})", self.expr_at(inner, ASSIGN)), POSTFIX),
            _ => self.expr_prec(inner),
        }
    }

    /// A Java `byte` read as its unsigned value.
    fn byte_to_int(&self, inner: &Expr) -> String {
        format!("({} & 0xff)", self.expr_at(inner, binary_precedence(BinaryOp::BitAnd)))
    }

    fn coerce(&self, inner: &Expr, kind: CoercionKind, to: &Type) -> (String, u8) {
        match kind {
            CoercionKind::Numeric if self.target == Target::Java && inner.ty == Type::Byte => {
                (self.byte_to_int(inner), PRIMARY)
            }
            CoercionKind::Upcast if self.target.is_c() => match to.as_class() {
                Some(class) => (
                    format!("({} *) {}", self.class_name(class), self.expr_at(inner, UNARY)),
                    UNARY,
                ),
                None => self.expr_prec(inner),
            },
            _ => self.expr_prec(inner),
        }
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    fn method_ref(&self, method: MethodId) -> String {
        let owner = self.class_name(self.program.method(method).owner);
        let name = self.names.method(method);
        match self.target {
            Target::C89 | Target::C99 => format!("{owner}_{name}"),
            Target::Java => format!("{owner}::{name}"),
            Target::CSharp | Target::JavaScript => format!("{owner}.{name}"),
        }
    }

    fn call(&self, method: MethodId, receiver: &Receiver, args: &[Expr], dispatch: Dispatch) -> (String, u8) {
        if self.target.is_c() {
            return (self.c_call(method, receiver, args, dispatch), POSTFIX);
        }
        let entry = self.program.method(method);
        let name = self.names.method(method);
        let callee = match receiver {
            Receiver::None => format!("{}.{name}", self.class_name(entry.owner)),
            Receiver::This => format!("this.{name}"),
            Receiver::Base => match self.target {
                Target::CSharp => format!("base.{name}"),
                _ => format!("super.{name}"),
            },
            Receiver::Object(object) => format!("{}.{name}", self.expr_at(object, POSTFIX)),
        };
        (format!("{callee}({})", self.args(args)), POSTFIX)
    }

    /// C calls name the function directly: `Owner_M` for static and
    /// non-virtual methods, the slot introducer's dispatcher for virtual
    /// calls and `Owner_M_impl` for a known dispatched body.
    fn c_call(&self, method: MethodId, receiver: &Receiver, args: &[Expr], dispatch: Dispatch) -> String {
        let entry = self.program.method(method);
        let name = self.names.method(method);
        let owner = entry.owner;
        let (function, self_class) = match dispatch {
            Dispatch::Static => {
                return format!("{}_{name}({})", self.class_name(owner), self.args(args));
            }
            Dispatch::Virtual => {
                let intro = self.lowering.slot_introducer(method).unwrap_or(owner);
                (format!("{}_{name}", self.class_name(intro)), intro)
            }
            Dispatch::Direct if entry.virtuality.is_dispatched() => {
                let intro = self.lowering.slot_introducer(method).unwrap_or(owner);
                (format!("{}_{name}_impl", self.class_name(owner)), intro)
            }
            Dispatch::Direct => (format!("{}_{name}", self.class_name(owner)), owner),
        };

        let mut all = vec![self.c_receiver(receiver, self_class)];
        all.extend(args.iter().map(|a| self.expr_at(a, ASSIGN)));
        format!("{function}({})", all.join(", "))
    }

    /// The receiver of a C call, cast to `class *` unless it already is one.
    fn c_receiver(&self, receiver: &Receiver, class: ClassId) -> String {
        let (text, static_class) = match receiver {
            Receiver::This | Receiver::Base => ("self".to_string(), self.current_class()),
            Receiver::Object(object) => (self.expr_at(object, UNARY), object.ty.as_class()),
            Receiver::None => ("NULL".to_string(), None),
        };
        if static_class == Some(class) {
            text
        } else {
            format!("({} *) {text}", self.class_name(class))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portc_core::Span;
    use portc_lowering::Lowering;
    use portc_registry::Program;

    fn int(v: i64) -> Expr {
        Expr::literal(ConstValue::Int(v), Type::Int, Span::default())
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let ty = left.ty.clone();
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            Span::default(),
        )
    }

    fn render(target: Target, e: &Expr) -> String {
        let program = Program::new();
        let lowering = Lowering::new(&program, Vec::new());
        Emitter::new(target, &lowering, Vec::new()).expr(e)
    }

    #[test]
    fn parenthesizes_by_precedence() {
        let sum = binary(BinaryOp::Add, int(1), int(2));
        let product = binary(BinaryOp::Mul, sum.clone(), int(3));
        assert_eq!(render(Target::C99, &product), "(1 + 2) * 3");

        let right_nested = binary(BinaryOp::Sub, int(1), binary(BinaryOp::Sub, int(2), int(3)));
        assert_eq!(render(Target::CSharp, &right_nested), "1 - (2 - 3)");

        let left_nested = binary(BinaryOp::Sub, binary(BinaryOp::Sub, int(1), int(2)), int(3));
        assert_eq!(render(Target::Java, &left_nested), "1 - 2 - 3");
    }

    #[test]
    fn javascript_integer_arithmetic() {
        let quotient = binary(BinaryOp::Div, int(7), int(2));
        assert_eq!(render(Target::JavaScript, &quotient), "7 / 2 | 0");
        assert_eq!(render(Target::C89, &quotient), "7 / 2");

        let product = binary(BinaryOp::Mul, int(7), int(2));
        assert_eq!(render(Target::JavaScript, &product), "Math.imul(7, 2)");

        let equal = binary(BinaryOp::Eq, int(1), int(1));
        assert_eq!(render(Target::JavaScript, &equal), "1 === 1");
    }

    #[test]
    fn negative_operand_of_negation() {
        let negated = Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(int(-1)),
            },
            Type::Int,
            Span::default(),
        );
        assert_eq!(render(Target::C99, &negated), "-(-1)");
    }

    #[test]
    fn string_equality() {
        let s = |v: &str| Expr::literal(ConstValue::String(v.into()), Type::String, Span::default());
        let eq = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Eq,
                left: Box::new(s("a")),
                right: Box::new(s("b")),
            },
            Type::Bool,
            Span::default(),
        );
        assert_eq!(render(Target::C89, &eq), r#"strcmp("a", "b") == 0"#);
        assert_eq!(render(Target::Java, &eq), r#"java.util.Objects.equals("a", "b")"#);
        assert_eq!(render(Target::CSharp, &eq), r#""a" == "b""#);
    }

    #[test]
    fn java_reads_bytes_unsigned() {
        let byte = Expr::literal(ConstValue::Int(200), Type::Byte, Span::default());
        let widened = byte.coerce(CoercionKind::Numeric, Type::Int);
        assert_eq!(render(Target::Java, &widened), "((byte) 200 & 0xff)");
        assert_eq!(render(Target::CSharp, &widened), "200");
    }

    #[test]
    fn javascript_casts_truncate() {
        let d = Expr::literal(ConstValue::float(2.5), Type::Double, Span::default());
        let cast = Expr::new(ExprKind::Cast(Box::new(d)), Type::Int, Span::default());
        assert_eq!(render(Target::JavaScript, &cast), "2.5 | 0");
        assert_eq!(render(Target::C99, &cast), "(int) 2.5");
    }
}
