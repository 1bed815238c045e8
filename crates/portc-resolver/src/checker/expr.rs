//! Expression checking: literals, names, members, indexing, `new`, casts
//! and conditionals.

use portc_core::ir::{Expr, ExprKind};
use portc_core::{ClassId, ConstValue, ResolveError, Span, Type};
use portc_parser::ast::{
    self, CastExpr, IndexExpr, LiteralExpr, LiteralKind, MemberExpr, NewExpr, NewKind,
    ResourceExpr, TernaryExpr,
};
use portc_registry::GlobalSymbol;

use super::{Checker, const_value, primitive_type};
use crate::conversion::{common_numeric, find_implicit, is_valid_cast};
use crate::fold;

/// Member name giving the element count of fixed arrays and strings.
const LENGTH: &str = "Length";

impl Checker<'_, '_> {
    /// Compute the type of an expression bottom-up.
    pub fn infer(&mut self, e: &ast::Expr<'_>) -> Result<Expr, ResolveError> {
        match e {
            ast::Expr::Literal(lit) => Ok(literal(lit)),
            ast::Expr::Ident(ident) => {
                let name = self.lookup(ident)?;
                self.name_expr(name, ident)
            }
            ast::Expr::This(span) => self.this_expr(*span),
            ast::Expr::Base(span) => Err(ResolveError::type_mismatch(
                *span,
                "base can only be used to access base class members",
            )),
            ast::Expr::Unary(u) => self.unary(u),
            ast::Expr::IncDec(i) => self.inc_dec(i),
            ast::Expr::Binary(b) => self.binary(b),
            ast::Expr::Assign(a) => self.assign(a),
            ast::Expr::Ternary(t) => self.conditional(t, None),
            ast::Expr::Call(c) => self.call(c),
            ast::Expr::Index(i) => self.index(i),
            ast::Expr::Member(m) => self.member(m),
            ast::Expr::Cast(c) => self.cast(c),
            ast::Expr::New(n) => self.new_expr(n),
            ast::Expr::Resource(r) => Ok(self.resource(r)),
            ast::Expr::Paren(p) => self.infer(p.expr),
            ast::Expr::InitList(list) => Err(ResolveError::type_mismatch(
                list.span,
                "initializer lists are only allowed for constant arrays",
            )),
        }
    }

    /// Check an expression against the type its context expects.
    pub fn check(&mut self, e: &ast::Expr<'_>, expected: &Type) -> Result<Expr, ResolveError> {
        let inner = e.unparenthesized();
        if let Type::Delegate(delegate) = expected {
            if let Some((name, methods)) = self.method_group(inner)? {
                return self.method_ref(&name, &methods, *delegate, e.span());
            }
        }
        if let ast::Expr::Ternary(t) = inner {
            return self.conditional(t, Some(expected));
        }
        let expr = self.infer(e)?;
        self.coerce_to(expr, expected)
    }

    fn member(&mut self, m: &MemberExpr<'_>) -> Result<Expr, ResolveError> {
        match m.object.unparenthesized() {
            ast::Expr::Ident(ident) => {
                if let Some(symbol) = self.type_name(ident)? {
                    return self.static_member(symbol, m);
                }
            }
            ast::Expr::Base(span) => {
                let base = self.base_class(*span)?;
                let Some(field) = self.program().find_field(base, m.member.name) else {
                    return Err(ResolveError::unknown_symbol(
                        m.member.span,
                        format!("base.{}", m.member.name),
                    ));
                };
                let this = self.this_expr(*span)?;
                return self.field_expr(this, field, m.span);
            }
            _ => {}
        }
        let object = self.infer(m.object)?;
        self.instance_member(object, m)
    }

    /// `Enum.Value` or `Class.CONSTANT`.
    fn static_member(&mut self, symbol: GlobalSymbol, m: &MemberExpr<'_>) -> Result<Expr, ResolveError> {
        let name = m.member.name;
        match symbol {
            GlobalSymbol::Enum(id) => {
                self.ctx.ensure_enum(id)?;
                let entry = self.program().enum_entry(id);
                match entry.value_index(name) {
                    Some(index) => Ok(Expr::new(
                        ExprKind::EnumValue { enum_id: id, index },
                        Type::Enum(id),
                        m.span,
                    )),
                    None if self.ctx.enum_in_progress(id) => Err(ResolveError::not_constant(
                        m.span,
                        format!("{}.{name} is used before it is defined", entry.name),
                    )),
                    None => Err(ResolveError::unknown_symbol(
                        m.member.span,
                        format!("{}.{name}", entry.name),
                    )),
                }
            }
            GlobalSymbol::Class(class) => {
                let program = self.program();
                if let Some(constant) = program.find_const(class, name) {
                    return self.const_expr(constant, m.span);
                }
                if program.find_field(class, name).is_some() {
                    return Err(ResolveError::type_mismatch(
                        m.span,
                        format!("field {name} requires an object reference"),
                    ));
                }
                if program.has_method(class, name) {
                    return Err(ResolveError::type_mismatch(
                        m.span,
                        format!("method {name} cannot be used as a value"),
                    ));
                }
                Err(ResolveError::unknown_symbol(
                    m.member.span,
                    format!("{}.{name}", program.class(class).name),
                ))
            }
            GlobalSymbol::Delegate(id) => Err(ResolveError::unknown_symbol(
                m.member.span,
                format!("{}.{name}", self.program().delegate(id).name),
            )),
        }
    }

    /// A member of a value: a field, or `Length` of a fixed array or string.
    pub(crate) fn instance_member(&mut self, object: Expr, m: &MemberExpr<'_>) -> Result<Expr, ResolveError> {
        let name = m.member.name;
        let ty = object.ty.clone();
        match &ty {
            Type::Class(class) => {
                let class = *class;
                let program = self.program();
                if let Some(field) = program.find_field(class, name) {
                    return self.field_expr(object, field, m.span);
                }
                if program.find_const(class, name).is_some() {
                    return Err(ResolveError::type_mismatch(
                        m.span,
                        format!("constant {name} must be accessed through its class name"),
                    ));
                }
                if program.has_method(class, name) {
                    return Err(ResolveError::type_mismatch(
                        m.span,
                        format!("method {name} cannot be used as a value"),
                    ));
                }
                Err(ResolveError::unknown_symbol(
                    m.member.span,
                    format!("{}.{name}", program.class(class).name),
                ))
            }
            Type::String if name == LENGTH => {
                if let Some(ConstValue::String(s)) = const_value(self.program(), &object) {
                    let len = ConstValue::Int(s.chars().count() as i64);
                    return Ok(Expr::literal(len, Type::Int, m.span));
                }
                Ok(Expr::new(ExprKind::StringLength(Box::new(object)), Type::Int, m.span))
            }
            Type::Array { len: Some(n), .. } if name == LENGTH => {
                Ok(Expr::literal(ConstValue::Int(i64::from(*n)), Type::Int, m.span))
            }
            Type::Array { .. } | Type::Pointer { .. } if name == LENGTH => Err(ResolveError::type_mismatch(
                m.span,
                "Length is only available on fixed arrays and strings",
            )),
            other => Err(ResolveError::unknown_symbol(
                m.member.span,
                format!("{}.{name}", self.display(other)),
            )),
        }
    }

    fn index(&mut self, i: &IndexExpr<'_>) -> Result<Expr, ResolveError> {
        let object = self.infer(i.object)?;
        let Some(elem) = object.ty.element_type().cloned() else {
            return Err(ResolveError::type_mismatch(
                i.span,
                format!("cannot index a value of type {}", self.display(&object.ty)),
            ));
        };
        let index = self.infer(i.index)?;
        let index = self.coerce_to(index, &Type::Int)?;
        if let (Some(len), Some(ConstValue::Int(at))) = (object.ty.fixed_len(), const_value(self.program(), &index)) {
            if at < 0 || at >= i64::from(len) {
                return Err(ResolveError::type_mismatch(
                    index.span,
                    format!("index {at} is outside the bounds of an array of length {len}"),
                ));
            }
        }
        Ok(Expr::new(
            ExprKind::Index {
                object: Box::new(object),
                index: Box::new(index),
            },
            elem,
            i.span,
        ))
    }

    fn cast(&mut self, c: &CastExpr<'_>) -> Result<Expr, ResolveError> {
        let target = primitive_type(c.target);
        let operand = self.infer(c.operand)?;
        if operand.ty == target {
            return Ok(operand);
        }
        if !is_valid_cast(&operand.ty, &target) {
            return Err(ResolveError::type_mismatch(
                c.span,
                format!("cannot cast {} to {}", self.display(&operand.ty), self.display(&target)),
            ));
        }
        if let Some(value) = const_value(self.program(), &operand) {
            let folded = fold::convert(&value, &target, true, c.span)?;
            return Ok(Expr::literal(folded, target, c.span));
        }
        Ok(Expr::new(ExprKind::Cast(Box::new(operand)), target, c.span))
    }

    pub(crate) fn conditional(&mut self, t: &TernaryExpr<'_>, expected: Option<&Type>) -> Result<Expr, ResolveError> {
        let cond = self.check(t.cond, &Type::Bool)?;
        let (then_expr, else_expr, ty) = match expected {
            Some(ty) => (self.check(t.then_expr, ty)?, self.check(t.else_expr, ty)?, ty.clone()),
            None => {
                let then_expr = self.infer(t.then_expr)?;
                let else_expr = self.infer(t.else_expr)?;
                let ty = self.unify(&then_expr, &else_expr)?;
                (self.coerce_to(then_expr, &ty)?, self.coerce_to(else_expr, &ty)?, ty)
            }
        };

        let program = self.program();
        if let (Some(ConstValue::Bool(c)), Some(a), Some(b)) = (
            const_value(program, &cond),
            const_value(program, &then_expr),
            const_value(program, &else_expr),
        ) {
            return Ok(Expr::literal(if c { a } else { b }, ty, t.span));
        }

        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            ty,
            t.span,
        ))
    }

    /// The type both branches of a conditional convert to.
    fn unify(&self, a: &Expr, b: &Expr) -> Result<Type, ResolveError> {
        if a.ty == b.ty {
            return Ok(a.ty.clone());
        }
        if let Some(ty) = common_numeric(&a.ty, &b.ty) {
            return Ok(ty);
        }
        let program = self.program();
        if find_implicit(program, &a.ty, &b.ty, const_value(program, a).as_ref()).is_some() {
            return Ok(b.ty.clone());
        }
        if find_implicit(program, &b.ty, &a.ty, const_value(program, b).as_ref()).is_some() {
            return Ok(a.ty.clone());
        }
        if let (Type::Class(x), Type::Class(y)) = (&a.ty, &b.ty) {
            if let Some(common) = program.common_ancestor(*x, *y) {
                return Ok(Type::Class(common));
            }
        }
        Err(ResolveError::type_mismatch(
            b.span,
            format!(
                "conditional branches have incompatible types {} and {}",
                self.display(&a.ty),
                self.display(&b.ty)
            ),
        ))
    }

    fn new_expr(&mut self, n: &NewExpr<'_>) -> Result<Expr, ResolveError> {
        match n.kind {
            NewKind::Object(ident) => {
                let class = match self.program().lookup_global(ident.name) {
                    Some(GlobalSymbol::Class(class)) => class,
                    Some(_) => {
                        return Err(ResolveError::type_mismatch(
                            ident.span,
                            format!("{} is not a class", ident.name),
                        ));
                    }
                    None => return Err(ResolveError::unknown_symbol(ident.span, ident.name)),
                };
                let entry = self.program().class(class);
                if entry.is_abstract {
                    return Err(ResolveError::AbstractInstantiation {
                        name: entry.name.clone(),
                        span: n.span,
                    });
                }
                if entry.is_static {
                    return Err(ResolveError::type_mismatch(
                        n.span,
                        format!("cannot instantiate static class {}", entry.name),
                    ));
                }
                if let Some(ctor) = entry.constructor {
                    let ctor = self.program().method(ctor);
                    self.check_access(class, ctor.visibility, &ctor.name, n.span)?;
                }
                Ok(Expr::new(ExprKind::New(class), Type::Class(class), n.span))
            }
            NewKind::Array { elem, len } => {
                let elem = self.resolve_type(&elem)?;
                if elem.is_void() {
                    return Err(ResolveError::type_mismatch(n.span, "arrays of void are not allowed"));
                }
                let len = self.infer(len)?;
                let len = self.coerce_to(len, &Type::Int)?;
                if let Some(ConstValue::Int(v)) = const_value(self.program(), &len) {
                    if v < 0 {
                        return Err(ResolveError::type_mismatch(len.span, "array length must not be negative"));
                    }
                }
                Ok(Expr::new(
                    ExprKind::NewArray {
                        elem: elem.clone(),
                        len: Box::new(len),
                    },
                    Type::array(elem, None),
                    n.span,
                ))
            }
        }
    }

    fn resource(&mut self, r: &ResourceExpr<'_>) -> Expr {
        let id = self.ctx.program.add_resource(r.path, r.span);
        Expr::new(ExprKind::Resource(id), Type::array_ref(Type::Byte, true), r.span)
    }

    /// The base class of the class being checked.
    pub(crate) fn base_class(&self, span: Span) -> Result<ClassId, ResolveError> {
        if self.env.is_static {
            return Err(self.no_instance("base", span));
        }
        self.env
            .class
            .and_then(|class| self.program().class(class).base)
            .ok_or_else(|| ResolveError::type_mismatch(span, "class has no base class"))
    }
}

/// Type a literal. Integers that fit `int` are `int`, larger ones `long`.
pub(crate) fn literal(lit: &LiteralExpr<'_>) -> Expr {
    let (value, ty) = match lit.kind {
        LiteralKind::Int(v) => (ConstValue::Int(v), int_literal_type(v)),
        LiteralKind::Float(v) => (ConstValue::float(fold::fit_float(v, &Type::Float)), Type::Float),
        LiteralKind::Double(v) => (ConstValue::float(v), Type::Double),
        LiteralKind::Bool(b) => (ConstValue::Bool(b), Type::Bool),
        LiteralKind::String(s) => (ConstValue::String(s.to_string()), Type::String),
        LiteralKind::Null => (ConstValue::Null, Type::Null),
    };
    Expr::literal(value, ty, lit.span)
}

pub(crate) fn int_literal_type(v: i64) -> Type {
    if i32::try_from(v).is_ok() { Type::Int } else { Type::Long }
}
