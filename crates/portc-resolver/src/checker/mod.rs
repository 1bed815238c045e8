//! Expression and statement checking.
//!
//! A [`Checker`] turns syntax into typed IR inside one environment: a method
//! body, a class constant initializer, an array length or an enum's values.
//! Checking is bidirectional. [`Checker::infer`] computes a type bottom-up,
//! [`Checker::check`] pushes an expected type down (which is what lets a
//! method name become a delegate value) and inserts the implicit conversion.
//!
//! Constant sub-expressions are folded as they are built, so a constant
//! expression always checks to a single literal (or a reference to a named
//! constant).

mod calls;
mod expr;
mod names;
mod operators;
mod stmt;

pub(crate) use names::Name;

use portc_core::ir::{CoercionKind, Expr, ExprKind};
use portc_core::{
    ClassId, ConstValue, EnumId, EnumValueEntry, LocalEntry, MethodId, ResolveError, Span, Type,
    Visibility,
};
use portc_parser::ast::{self, ArraySuffix, ConstDecl, EnumDecl, PrimitiveType, TypeBase, TypeExpr};
use portc_registry::{GlobalSymbol, Program};

use crate::context::Context;
use crate::conversion::find_implicit;
use crate::fold;
use crate::scope::LocalScope;

/// Innermost statement a `break` or `continue` may leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JumpTarget {
    Loop,
    Switch,
}

/// What is in scope while checking.
#[derive(Debug, Default)]
pub(crate) struct Env {
    pub class: Option<ClassId>,
    pub method: Option<MethodId>,
    /// No `this`: a static method or a constant initializer.
    pub is_static: bool,
    /// Only constants may be referenced.
    pub in_constant: bool,
    pub return_type: Type,
    /// Enum whose values may be named without qualification.
    pub enum_scope: Option<EnumId>,
    pub scope: LocalScope,
    pub locals: Vec<LocalEntry>,
    pub jumps: Vec<JumpTarget>,
}

/// Checks expressions and statements against the program being built.
pub struct Checker<'c, 'ast> {
    pub(crate) ctx: &'c mut Context<'ast>,
    pub(crate) env: Env,
}

impl<'c, 'ast> Checker<'c, 'ast> {
    /// A checker for constant expressions evaluated in the scope of `class`.
    pub fn constant(ctx: &'c mut Context<'ast>, class: Option<ClassId>) -> Self {
        Self {
            ctx,
            env: Env {
                class,
                is_static: true,
                in_constant: true,
                ..Env::default()
            },
        }
    }

    /// A checker for the value initializers of an enum.
    pub fn enum_values(ctx: &'c mut Context<'ast>, id: EnumId) -> Self {
        Self {
            ctx,
            env: Env {
                is_static: true,
                in_constant: true,
                enum_scope: Some(id),
                ..Env::default()
            },
        }
    }

    /// A checker for the body of `method`.
    pub fn method(ctx: &'c mut Context<'ast>, method: MethodId) -> Self {
        let entry = ctx.program.method(method);
        let env = Env {
            class: Some(entry.owner),
            method: Some(method),
            is_static: entry.is_static(),
            return_type: entry.return_type.clone(),
            ..Env::default()
        };
        Self { ctx, env }
    }

    pub(crate) fn program(&self) -> &Program {
        &self.ctx.program
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// Resolve a written type.
    ///
    /// Array suffixes apply right to left: `int[3][4]` is three arrays of
    /// four ints. A fixed length must be a positive constant.
    pub fn resolve_type(&mut self, ty: &TypeExpr<'_>) -> Result<Type, ResolveError> {
        let mut resolved = match ty.base {
            TypeBase::Primitive(p) => primitive_type(p),
            TypeBase::Named(ident) => match self.program().lookup_global(ident.name) {
                Some(GlobalSymbol::Class(id)) => Type::Class(id),
                Some(GlobalSymbol::Enum(id)) => Type::Enum(id),
                Some(GlobalSymbol::Delegate(id)) => Type::Delegate(id),
                None => return Err(ResolveError::unknown_symbol(ident.span, ident.name)),
            },
        };

        if resolved.is_void() && !ty.suffixes.is_empty() {
            return Err(ResolveError::type_mismatch(ty.span, "arrays of void are not allowed"));
        }

        for suffix in ty.suffixes.iter().rev() {
            resolved = match suffix {
                ArraySuffix::Open => Type::array_ref(resolved, false),
                ArraySuffix::Fixed(len) => {
                    let n = self.const_int(len)?;
                    let n = u32::try_from(n)
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ResolveError::type_mismatch(len.span(), "array length must be positive"))?;
                    Type::array(resolved, Some(n))
                }
            };
        }

        if ty.is_const {
            match &mut resolved {
                Type::Pointer { readonly, .. } => *readonly = true,
                _ => {
                    return Err(ResolveError::type_mismatch(
                        ty.span,
                        "const only applies to array references",
                    ));
                }
            }
        }
        Ok(resolved)
    }

    /// Evaluate an integer constant expression.
    pub(crate) fn const_int(&mut self, e: &ast::Expr<'_>) -> Result<i64, ResolveError> {
        let expr = self.infer(e)?;
        if !expr.ty.is_integer() {
            return Err(ResolveError::type_mismatch(
                e.span(),
                format!("expected an integer, found {}", self.display(&expr.ty)),
            ));
        }
        const_value(self.program(), &expr)
            .and_then(|v| v.as_int())
            .ok_or_else(|| ResolveError::not_constant(e.span(), "expression is not constant"))
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Type and value of a named constant.
    pub fn eval_const(&mut self, decl: &ConstDecl<'_>) -> Result<(Type, ConstValue), ResolveError> {
        let name = decl.name.name;
        if !decl.ty.suffixes.is_empty() {
            return self.eval_const_array(decl);
        }

        let ty = self.resolve_type(&decl.ty)?;
        if !is_constant_type(&ty) {
            return Err(ResolveError::type_mismatch(
                decl.ty.span,
                format!("constant {name} must have a primitive, string or enum type"),
            ));
        }
        let value = self.check(decl.value, &ty)?;
        let value = const_value(self.program(), &value).ok_or_else(|| {
            ResolveError::not_constant(decl.value.span(), format!("value of {name} is not constant"))
        })?;
        Ok((ty, value))
    }

    fn eval_const_array(&mut self, decl: &ConstDecl<'_>) -> Result<(Type, ConstValue), ResolveError> {
        let name = decl.name.name;
        let [suffix] = decl.ty.suffixes else {
            return Err(ResolveError::type_mismatch(
                decl.ty.span,
                format!("constant array {name} must have one dimension"),
            ));
        };

        let elem = self.resolve_type(&TypeExpr {
            is_const: false,
            suffixes: &[],
            ..decl.ty
        })?;
        if !is_constant_type(&elem) {
            return Err(ResolveError::type_mismatch(
                decl.ty.span,
                format!("elements of constant array {name} must have a primitive, string or enum type"),
            ));
        }

        let ast::Expr::InitList(list) = decl.value.unparenthesized() else {
            return Err(ResolveError::type_mismatch(
                decl.value.span(),
                format!("constant array {name} requires an initializer list"),
            ));
        };
        if list.elements.is_empty() {
            return Err(ResolveError::type_mismatch(list.span, format!("constant array {name} is empty")));
        }
        if let ArraySuffix::Fixed(len) = suffix {
            let declared = self.const_int(len)?;
            if declared != list.elements.len() as i64 {
                return Err(ResolveError::type_mismatch(
                    list.span,
                    format!(
                        "constant array {name} declares {declared} elements but is initialized with {}",
                        list.elements.len()
                    ),
                ));
            }
        }

        let mut values = Vec::with_capacity(list.elements.len());
        for element in list.elements {
            let value = self.check(element, &elem)?;
            let value = const_value(self.program(), &value)
                .ok_or_else(|| ResolveError::not_constant(element.span(), "array element is not constant"))?;
            values.push(value);
        }
        Ok((Type::array(elem, Some(values.len() as u32)), ConstValue::Array(values)))
    }

    /// Assign values to the members of an enum, in declaration order.
    ///
    /// A member without an initializer is one greater than the previous one;
    /// the first defaults to zero.
    pub fn eval_enum(&mut self, decl: &EnumDecl<'_>) -> Result<(), ResolveError> {
        let Some(id) = self.env.enum_scope else {
            return Ok(());
        };
        let mut next: i64 = 0;
        for value in decl.values {
            let name = value.name.name;
            if self.program().enum_entry(id).value_index(name).is_some() {
                return Err(ResolveError::duplicate(value.name.span, name));
            }
            let resolved = match value.value {
                Some(e) => {
                    let expr = self.infer(e)?;
                    if !(expr.ty.is_integer() || expr.ty == Type::Enum(id)) {
                        return Err(ResolveError::type_mismatch(
                            e.span(),
                            format!("value of {name} must be an integer"),
                        ));
                    }
                    let v = const_value(self.program(), &expr)
                        .and_then(|v| v.as_int())
                        .ok_or_else(|| ResolveError::not_constant(e.span(), format!("value of {name} is not constant")))?;
                    fold::fit_integer(v, &Type::Int, e.span())?
                }
                None => fold::fit_integer(next, &Type::Int, value.span)?,
            };
            self.ctx.program.enum_mut(id).values.push(EnumValueEntry {
                name: name.to_string(),
                value: resolved,
                span: value.span,
            });
            next = resolved + 1;
        }
        Ok(())
    }

    // ==========================================================================
    // Conversions
    // ==========================================================================

    /// Convert `expr` to `to` implicitly, or fail with `TypeMismatch`.
    pub(crate) fn coerce_to(&self, expr: Expr, to: &Type) -> Result<Expr, ResolveError> {
        let program = self.program();
        if is_constant_array(&expr) && matches!(to, Type::Pointer { readonly: false, .. }) {
            return Err(ResolveError::type_mismatch(
                expr.span,
                "a constant array cannot be converted to a writable array reference",
            ));
        }

        let value = const_value(program, &expr);
        let Some(conversion) = find_implicit(program, &expr.ty, to, value.as_ref()) else {
            return Err(ResolveError::type_mismatch(
                expr.span,
                format!("cannot convert {} to {}", self.display(&expr.ty), self.display(to)),
            ));
        };

        match (conversion.kind, value) {
            (None, _) => Ok(expr),
            (Some(CoercionKind::Numeric), Some(value)) => {
                let folded = fold::convert(&value, to, false, expr.span)?;
                Ok(Expr::literal(folded, to.clone(), expr.span))
            }
            (Some(kind), _) => Ok(expr.coerce(kind, to.clone())),
        }
    }

    // ==========================================================================
    // Access
    // ==========================================================================

    /// Enforce member visibility from the class being checked.
    pub(crate) fn check_access(
        &self,
        owner: ClassId,
        visibility: Visibility,
        name: &str,
        span: Span,
    ) -> Result<(), ResolveError> {
        if self.is_accessible(owner, visibility) {
            Ok(())
        } else {
            Err(ResolveError::Inaccessible {
                name: name.to_string(),
                span,
            })
        }
    }

    pub(crate) fn is_accessible(&self, owner: ClassId, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Private => self.env.class == Some(owner),
            Visibility::Protected => self
                .env
                .class
                .is_some_and(|class| self.program().is_subclass_of(class, owner)),
        }
    }

    /// Error for an instance member used where there is no `this`.
    pub(crate) fn no_instance(&self, name: &str, span: Span) -> ResolveError {
        if self.env.in_constant {
            ResolveError::not_constant(span, format!("{name} is not a constant"))
        } else {
            ResolveError::type_mismatch(span, format!("instance member {name} cannot be used in a static method"))
        }
    }

    pub(crate) fn display(&self, ty: &Type) -> String {
        ty.display(self.program()).to_string()
    }
}

/// The folded value of a constant expression.
pub fn const_value(program: &Program, expr: &Expr) -> Option<ConstValue> {
    match &expr.kind {
        ExprKind::Literal(value) => Some(value.clone()),
        ExprKind::Const(id) => program.const_entry(*id).value.clone(),
        ExprKind::EnumValue { enum_id, index } => program
            .enum_entry(*enum_id)
            .values
            .get(*index as usize)
            .map(|v| ConstValue::Enum {
                id: *enum_id,
                value: v.value,
            }),
        ExprKind::Coerce {
            expr,
            kind: CoercionKind::NullToReference,
        } => const_value(program, expr),
        _ => None,
    }
}

fn is_constant_array(expr: &Expr) -> bool {
    matches!(expr.ty, Type::Array { len: Some(_), .. })
        && matches!(expr.kind, ExprKind::Const(_) | ExprKind::Literal(_))
}

fn is_constant_type(ty: &Type) -> bool {
    ty.is_primitive() || matches!(ty, Type::String | Type::Enum(_))
}

pub(crate) fn primitive_type(p: PrimitiveType) -> Type {
    match p {
        PrimitiveType::Void => Type::Void,
        PrimitiveType::Bool => Type::Bool,
        PrimitiveType::Byte => Type::Byte,
        PrimitiveType::Int => Type::Int,
        PrimitiveType::Long => Type::Long,
        PrimitiveType::Float => Type::Float,
        PrimitiveType::Double => Type::Double,
        PrimitiveType::String => Type::String,
    }
}
