//! Method calls, delegate calls and method references.

use portc_core::ir::{Dispatch, Expr, ExprKind, Receiver};
use portc_core::{DelegateId, MethodId, ResolveError, Span, Type, Virtuality};
use portc_parser::ast::{self, CallExpr, MemberExpr};
use portc_registry::GlobalSymbol;

use super::{Checker, Name};
use crate::overload::resolve_overload;

/// How the called method was named.
enum CallSite {
    /// `Method(...)`: on `this`, or a static method of the class chain.
    Unqualified,
    /// `Class.Method(...)`
    Type,
    /// `base.Method(...)`
    Base,
    /// `object.Method(...)`
    Object(Expr),
}

impl Checker<'_, '_> {
    pub(crate) fn call(&mut self, c: &CallExpr<'_>) -> Result<Expr, ResolveError> {
        let args = c
            .args
            .iter()
            .map(|arg| self.infer(arg))
            .collect::<Result<Vec<_>, _>>()?;

        match c.callee.unparenthesized() {
            ast::Expr::Ident(ident) => match self.lookup(ident)? {
                Name::Methods(methods) => self.call_method(ident.name, &methods, CallSite::Unqualified, args, c.span),
                name => {
                    let callee = self.name_expr(name, ident)?;
                    self.delegate_call(callee, args, c.span)
                }
            },
            ast::Expr::Member(m) => self.member_call(m, args, c.span),
            other => {
                let callee = self.infer(other)?;
                self.delegate_call(callee, args, c.span)
            }
        }
    }

    fn member_call(&mut self, m: &MemberExpr<'_>, args: Vec<Expr>, span: Span) -> Result<Expr, ResolveError> {
        let name = m.member.name;
        match m.object.unparenthesized() {
            ast::Expr::Base(base_span) => {
                let base = self.base_class(*base_span)?;
                let methods = self.program().find_methods(base, name);
                if methods.is_empty() {
                    return Err(ResolveError::unknown_symbol(m.member.span, format!("base.{name}")));
                }
                return self.call_method(name, &methods, CallSite::Base, args, span);
            }
            ast::Expr::Ident(ident) => {
                if let Some(GlobalSymbol::Class(class)) = self.type_name(ident)? {
                    let methods = self.program().find_methods(class, name);
                    if methods.is_empty() {
                        return Err(ResolveError::unknown_symbol(
                            m.member.span,
                            format!("{}.{name}", ident.name),
                        ));
                    }
                    return self.call_method(name, &methods, CallSite::Type, args, span);
                }
            }
            _ => {}
        }

        let object = self.infer(m.object)?;
        if let Some(class) = object.ty.as_class() {
            let methods = self.program().find_methods(class, name);
            if !methods.is_empty() {
                return self.call_method(name, &methods, CallSite::Object(object), args, span);
            }
        }
        let callee = self.instance_member(object, m)?;
        self.delegate_call(callee, args, span)
    }

    fn call_method(
        &mut self,
        name: &str,
        candidates: &[MethodId],
        site: CallSite,
        args: Vec<Expr>,
        span: Span,
    ) -> Result<Expr, ResolveError> {
        let chosen = self.accessible_overload(name, candidates, &args, span)?;
        let method = self.program().method(chosen);

        let is_static = method.is_static();
        let virtuality = method.virtuality;
        let return_type = method.return_type.clone();
        let params = method.param_types();

        let args = args
            .into_iter()
            .zip(&params)
            .map(|(arg, ty)| self.coerce_to(arg, ty))
            .collect::<Result<Vec<_>, _>>()?;

        let dynamic = if virtuality.is_dispatched() {
            Dispatch::Virtual
        } else {
            Dispatch::Direct
        };
        let (receiver, dispatch) = match site {
            _ if is_static && !matches!(site, CallSite::Object(_)) => (Receiver::None, Dispatch::Static),
            CallSite::Object(_) if is_static => {
                return Err(ResolveError::type_mismatch(
                    span,
                    format!("static method {name} must be called through its class name"),
                ));
            }
            CallSite::Type => {
                return Err(ResolveError::type_mismatch(
                    span,
                    format!("an object reference is required to call {name}"),
                ));
            }
            CallSite::Unqualified => {
                if self.env.is_static {
                    return Err(self.no_instance(name, span));
                }
                (Receiver::This, dynamic)
            }
            CallSite::Base => {
                if virtuality == Virtuality::Abstract {
                    return Err(ResolveError::type_mismatch(
                        span,
                        format!("cannot call abstract method {name} through base"),
                    ));
                }
                (Receiver::Base, Dispatch::Direct)
            }
            CallSite::Object(object) if matches!(object.kind, ExprKind::This) => (Receiver::This, dynamic),
            CallSite::Object(object) => (Receiver::Object(Box::new(object)), dynamic),
        };

        Ok(Expr::new(
            ExprKind::Call {
                method: chosen,
                receiver,
                args,
                dispatch,
            },
            return_type,
            span,
        ))
    }

    /// Rank only the overloads visible from here. When none of them
    /// applies but a hidden one would, the call is `Inaccessible`.
    fn accessible_overload(
        &self,
        name: &str,
        candidates: &[MethodId],
        args: &[Expr],
        span: Span,
    ) -> Result<MethodId, ResolveError> {
        let program = self.program();
        let accessible: Vec<MethodId> = candidates
            .iter()
            .copied()
            .filter(|m| {
                let method = program.method(*m);
                self.is_accessible(method.owner, method.visibility)
            })
            .collect();
        match resolve_overload(program, name, &accessible, args, span) {
            Ok(chosen) => Ok(chosen.method),
            Err(error @ ResolveError::NoApplicableOverload { .. }) if accessible.len() < candidates.len() => {
                let hidden = resolve_overload(program, name, candidates, args, span).map_err(|_| error)?;
                let method = program.method(hidden.method);
                self.check_access(method.owner, method.visibility, name, span)?;
                Ok(hidden.method)
            }
            Err(error) => Err(error),
        }
    }

    fn delegate_call(&self, callee: Expr, args: Vec<Expr>, span: Span) -> Result<Expr, ResolveError> {
        let Type::Delegate(delegate) = callee.ty else {
            return Err(ResolveError::type_mismatch(
                callee.span,
                format!("a value of type {} cannot be called", self.display(&callee.ty)),
            ));
        };
        let entry = self.program().delegate(delegate);
        if entry.params.len() != args.len() {
            return Err(ResolveError::type_mismatch(
                span,
                format!("delegate {} takes {} arguments", entry.name, entry.params.len()),
            ));
        }
        let return_type = entry.return_type.clone();
        let args = args
            .into_iter()
            .zip(entry.param_types())
            .map(|(arg, ty)| self.coerce_to(arg, ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expr::new(
            ExprKind::DelegateCall {
                callee: Box::new(callee),
                delegate,
                args,
            },
            return_type,
            span,
        ))
    }

    /// The overloads an expression names, when it names a method.
    pub(crate) fn method_group(&self, e: &ast::Expr<'_>) -> Result<Option<(String, Vec<MethodId>)>, ResolveError> {
        match e {
            ast::Expr::Ident(ident) => Ok(match self.lookup(ident)? {
                Name::Methods(methods) => Some((ident.name.to_string(), methods)),
                _ => None,
            }),
            ast::Expr::Member(m) => {
                let ast::Expr::Ident(ident) = m.object.unparenthesized() else {
                    return Ok(None);
                };
                let Some(GlobalSymbol::Class(class)) = self.type_name(ident)? else {
                    return Ok(None);
                };
                let methods = self.program().find_methods(class, m.member.name);
                Ok((!methods.is_empty()).then(|| (m.member.name.to_string(), methods)))
            }
            _ => Ok(None),
        }
    }

    /// A static method used as a delegate value.
    ///
    /// The method's parameter and return types must match the delegate's
    /// exactly.
    pub(crate) fn method_ref(
        &self,
        name: &str,
        methods: &[MethodId],
        delegate: DelegateId,
        span: Span,
    ) -> Result<Expr, ResolveError> {
        let program = self.program();
        let target = program.delegate(delegate);
        let matches = |id: &MethodId| {
            let method = program.method(*id);
            method.return_type == target.return_type && method.param_types().iter().eq(target.param_types())
        };

        let Some(chosen) = methods.iter().copied().find(|m| matches(m)) else {
            return Err(ResolveError::type_mismatch(
                span,
                format!("no overload of {name} matches delegate {}", target.name),
            ));
        };
        let method = program.method(chosen);
        if !method.is_static() {
            return Err(ResolveError::type_mismatch(
                span,
                format!("only static methods can be converted to delegates; {name} is an instance method"),
            ));
        }
        self.check_access(method.owner, method.visibility, name, span)?;
        Ok(Expr::new(
            ExprKind::MethodRef(chosen),
            Type::Delegate(delegate),
            span,
        ))
    }
}
