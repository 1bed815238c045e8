//! Name lookup.
//!
//! An unqualified name resolves, innermost first, through the block scopes,
//! the method's parameters, the members of the class and its bases, the
//! values of the enum being defined, and finally the global namespace.

use portc_core::ir::{Expr, ExprKind};
use portc_core::{ConstId, ConstOwner, EnumId, FieldId, LocalId, MethodId, ResolveError, Span, Type};
use portc_parser::ast::Ident;
use portc_registry::GlobalSymbol;

use super::Checker;
use crate::scope::LocalBinding;

/// What an identifier refers to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Name {
    Local { id: LocalId, ty: Type },
    Const(ConstId),
    Param(u32),
    Field(FieldId),
    /// Every overload visible under the name, most derived first.
    Methods(Vec<MethodId>),
    EnumValue(EnumId, u32),
    Global(GlobalSymbol),
}

impl Checker<'_, '_> {
    pub(crate) fn lookup(&self, ident: &Ident<'_>) -> Result<Name, ResolveError> {
        let name = ident.name;
        let program = self.program();

        if let Some(binding) = self.env.scope.lookup(name) {
            return Ok(match binding {
                LocalBinding::Variable { id, ty } => Name::Local {
                    id: *id,
                    ty: ty.clone(),
                },
                LocalBinding::Constant(id) => Name::Const(*id),
            });
        }

        if let Some(method) = self.env.method {
            if let Some(index) = program.method(method).params.iter().position(|p| p.name == name) {
                return Ok(Name::Param(index as u32));
            }
        }

        if let Some(class) = self.env.class {
            if let Some(field) = program.find_field(class, name) {
                return Ok(Name::Field(field));
            }
            if let Some(constant) = program.find_const(class, name) {
                return Ok(Name::Const(constant));
            }
            let methods = program.find_methods(class, name);
            if !methods.is_empty() {
                return Ok(Name::Methods(methods));
            }
        }

        if let Some(id) = self.env.enum_scope {
            if let Some(index) = program.enum_entry(id).value_index(name) {
                return Ok(Name::EnumValue(id, index));
            }
        }

        program
            .lookup_global(name)
            .map(Name::Global)
            .ok_or_else(|| ResolveError::unknown_symbol(ident.span, name))
    }

    /// The global type an identifier names, if it names one.
    pub(crate) fn type_name(&self, ident: &Ident<'_>) -> Result<Option<GlobalSymbol>, ResolveError> {
        Ok(match self.lookup(ident)? {
            Name::Global(symbol) => Some(symbol),
            _ => None,
        })
    }

    /// The value expression for a resolved name.
    pub(crate) fn name_expr(&mut self, name: Name, ident: &Ident<'_>) -> Result<Expr, ResolveError> {
        let span = ident.span;
        match name {
            Name::Local { id, ty } => Ok(Expr::new(ExprKind::Local(id), ty, span)),
            Name::Const(id) => self.const_expr(id, span),
            Name::Param(index) => {
                if self.env.in_constant {
                    return Err(self.no_instance(ident.name, span));
                }
                let method = self.env.method.map(|m| self.program().method(m));
                let ty = method
                    .and_then(|m| m.params.get(index as usize))
                    .map(|p| p.ty.clone())
                    .unwrap_or_default();
                Ok(Expr::new(ExprKind::Param(index), ty, span))
            }
            Name::Field(field) => {
                if self.env.is_static {
                    return Err(self.no_instance(ident.name, span));
                }
                let this = self.this_expr(span)?;
                self.field_expr(this, field, span)
            }
            Name::Methods(_) => Err(ResolveError::type_mismatch(
                span,
                format!("method {} cannot be used as a value", ident.name),
            )),
            Name::EnumValue(id, index) => Ok(Expr::new(ExprKind::EnumValue { enum_id: id, index }, Type::Enum(id), span)),
            Name::Global(_) => Err(ResolveError::type_mismatch(
                span,
                format!("{} is a type, not a value", ident.name),
            )),
        }
    }

    /// A reference to a named constant, evaluating it first if needed.
    pub(crate) fn const_expr(&mut self, id: ConstId, span: Span) -> Result<Expr, ResolveError> {
        self.ctx.ensure_const(id, span)?;
        let entry = self.program().const_entry(id);
        if let ConstOwner::Class(owner) = entry.owner {
            self.check_access(owner, entry.visibility, &entry.name, span)?;
        }
        Ok(Expr::new(ExprKind::Const(id), entry.ty.clone(), span))
    }

    /// `object.field`, checking visibility.
    pub(crate) fn field_expr(&self, object: Expr, field: FieldId, span: Span) -> Result<Expr, ResolveError> {
        let entry = self.program().field(field);
        self.check_access(entry.owner, entry.visibility, &entry.name, span)?;
        let ty = entry.ty.clone();
        Ok(Expr::new(
            ExprKind::Field {
                object: Box::new(object),
                field,
            },
            ty,
            span,
        ))
    }

    pub(crate) fn this_expr(&self, span: Span) -> Result<Expr, ResolveError> {
        match self.env.class {
            Some(class) if !self.env.is_static => Ok(Expr::new(ExprKind::This, Type::Class(class), span)),
            _ if self.env.in_constant => Err(ResolveError::not_constant(span, "this is not a constant")),
            _ => Err(ResolveError::type_mismatch(span, "this cannot be used in a static method")),
        }
    }
}
