//! Member pass: register fields, constants, constructors and methods.
//!
//! Classes are visited bases first, so every inherited member is already
//! registered when a derived class is checked for name clashes. Constants
//! are registered for every class before any field or method, which lets a
//! field's array length name a constant of a class declared later.

use portc_core::{
    ClassId, ConstEntry, ConstId, ConstOwner, DelegateId, EnumId, FieldEntry, FieldId, MethodEntry,
    MethodId, MethodKind, ParamEntry, ResolveError, SignatureHash, Type, Virtuality, Visibility,
};
use portc_parser::ast::{
    ClassDecl, ClassMember, ConstructorDecl, FieldDecl, MethodDecl, Modifiers, Param, TypeExpr,
};
use portc_registry::Program;

use crate::context::Context;

/// Counts of what was registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemberOutput {
    pub fields: usize,
    pub consts: usize,
    pub methods: usize,
}

pub struct MemberPass<'a, 'ast> {
    ctx: &'a mut Context<'ast>,
    order: &'a [ClassId],
    output: MemberOutput,
}

impl<'a, 'ast> MemberPass<'a, 'ast> {
    pub fn new(ctx: &'a mut Context<'ast>, order: &'a [ClassId]) -> Self {
        Self {
            ctx,
            order,
            output: MemberOutput::default(),
        }
    }

    pub fn run(mut self) -> Result<MemberOutput, ResolveError> {
        self.delegates()?;

        for &class in self.order {
            self.register_consts(class)?;
        }
        for &class in self.order {
            self.register_members(class)?;
        }

        for index in 0..self.ctx.program.enums().len() {
            self.ctx.ensure_enum(EnumId::from_index(index))?;
        }
        let consts: Vec<_> = self.ctx.program.consts().iter().map(|c| (c.id, c.span)).collect();
        for (id, span) in consts {
            self.ctx.ensure_const(id, span)?;
        }
        Ok(self.output)
    }

    fn delegates(&mut self) -> Result<(), ResolveError> {
        let decls = self.ctx.delegates.clone();
        for (index, decl) in decls.into_iter().enumerate() {
            let return_type = self.return_type(&decl.return_type, None)?;
            let params = self.params(decl.params, None)?;
            let entry = self.ctx.program.delegate_mut(DelegateId::from_index(index));
            entry.return_type = return_type;
            entry.params = params;
        }
        Ok(())
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    fn register_consts(&mut self, class: ClassId) -> Result<(), ResolveError> {
        let decl: &'ast ClassDecl<'ast> = self.ctx.classes[class.index()];
        for member in decl.members {
            let ClassMember::Const(c) = *member else {
                continue;
            };
            let name = c.name.name;
            if self.ctx.program.find_const(class, name).is_some() {
                return Err(ResolveError::duplicate(c.name.span, name));
            }
            let id = self.ctx.program.add_const(ConstEntry {
                id: ConstId(0),
                name: name.to_string(),
                owner: ConstOwner::Class(class),
                visibility: c.modifiers.visibility(),
                ty: Type::Void,
                value: None,
                span: c.name.span,
            });
            self.ctx.defer_const(id, c);
            self.output.consts += 1;
        }
        Ok(())
    }

    // ==========================================================================
    // Fields and methods
    // ==========================================================================

    fn register_members(&mut self, class: ClassId) -> Result<(), ResolveError> {
        let decl: &'ast ClassDecl<'ast> = self.ctx.classes[class.index()];

        // Constants of this class against members inherited from the bases,
        // which are complete by now.
        if let Some(base) = self.ctx.program.class(class).base {
            for &id in &self.ctx.program.class(class).consts {
                let entry = self.ctx.program.const_entry(id);
                if self.ctx.program.find_field(base, &entry.name).is_some()
                    || self.ctx.program.has_method(base, &entry.name)
                {
                    return Err(ResolveError::duplicate(entry.span, entry.name.clone()));
                }
            }
        }

        for member in decl.members {
            match *member {
                ClassMember::Field(f) => self.field(class, decl, f)?,
                ClassMember::Method(m) => self.method(class, decl, m)?,
                ClassMember::Constructor(c) => self.constructor(class, decl, c)?,
                ClassMember::Const(_) => {}
            }
        }
        Ok(())
    }

    fn field(&mut self, class: ClassId, decl: &ClassDecl<'_>, f: &FieldDecl<'_>) -> Result<(), ResolveError> {
        let name = f.name.name;
        if decl.modifiers.contains(Modifiers::STATIC) {
            return Err(ResolveError::type_mismatch(
                f.name.span,
                format!("static class {} cannot declare field {name}", decl.name.name),
            ));
        }
        let program = &self.ctx.program;
        if program.find_field(class, name).is_some()
            || program.find_const(class, name).is_some()
            || program.has_method(class, name)
        {
            return Err(ResolveError::duplicate(f.name.span, name));
        }

        let ty = self.ctx.resolve_type(&f.ty, Some(class))?;
        if ty.is_void() {
            return Err(ResolveError::type_mismatch(f.ty.span, format!("field {name} cannot be void")));
        }
        self.ctx.program.add_field(FieldEntry {
            id: FieldId(0),
            name: name.to_string(),
            owner: class,
            visibility: f.modifiers.visibility(),
            ty,
            span: f.name.span,
        });
        self.output.fields += 1;
        Ok(())
    }

    fn constructor(
        &mut self,
        class: ClassId,
        decl: &ClassDecl<'_>,
        c: &'ast ConstructorDecl<'ast>,
    ) -> Result<(), ResolveError> {
        if decl.modifiers.contains(Modifiers::STATIC) {
            return Err(ResolveError::type_mismatch(
                c.name.span,
                format!("static class {} cannot declare a constructor", decl.name.name),
            ));
        }
        if self.ctx.program.class(class).constructor.is_some() {
            return Err(ResolveError::duplicate(c.name.span, c.name.name));
        }
        let id = self.ctx.program.add_method(MethodEntry {
            id: MethodId(0),
            name: c.name.name.to_string(),
            owner: class,
            // Constructors are public unless marked otherwise.
            visibility: if c.modifiers.intersects(Modifiers::VISIBILITY) {
                c.modifiers.visibility()
            } else {
                Visibility::Public
            },
            kind: MethodKind::Constructor,
            virtuality: Virtuality::None,
            return_type: Type::Void,
            params: Vec::new(),
            signature: SignatureHash::of(c.name.name, &[]),
            overrides: None,
            locals: Vec::new(),
            body: None,
            span: c.name.span,
        });
        self.ctx.bodies.push((id, c.body));
        self.output.methods += 1;
        Ok(())
    }

    fn method(&mut self, class: ClassId, decl: &ClassDecl<'_>, m: &'ast MethodDecl<'ast>) -> Result<(), ResolveError> {
        let name = m.name.name;
        let is_static = m.modifiers.contains(Modifiers::STATIC);
        if decl.modifiers.contains(Modifiers::STATIC) && !is_static {
            return Err(ResolveError::type_mismatch(
                m.name.span,
                format!("method {name} of static class {} must be static", decl.name.name),
            ));
        }
        if self.ctx.program.find_field(class, name).is_some() || self.ctx.program.find_const(class, name).is_some() {
            return Err(ResolveError::duplicate(m.name.span, name));
        }

        let return_type = self.return_type(&m.return_type, Some(class))?;
        let params = self.params(m.params, Some(class))?;
        let param_types: Vec<Type> = params.iter().map(|p| p.ty.clone()).collect();
        let signature = SignatureHash::of(name, &param_types);

        let program = &self.ctx.program;
        let clash = program
            .class(class)
            .methods
            .iter()
            .any(|&other| program.method(other).signature == signature);
        if clash {
            return Err(ResolveError::duplicate(
                m.name.span,
                format!("{}.{name}({})", decl.name.name, display_params(program, &param_types)),
            ));
        }

        let virtuality = if m.modifiers.contains(Modifiers::ABSTRACT) {
            Virtuality::Abstract
        } else if m.modifiers.contains(Modifiers::OVERRIDE) {
            Virtuality::Override
        } else if m.modifiers.contains(Modifiers::VIRTUAL) {
            Virtuality::Virtual
        } else {
            Virtuality::None
        };
        if is_static && virtuality.is_dispatched() {
            return Err(ResolveError::InvalidOverride {
                message: format!("static method {name} cannot be {}", virtuality_keyword(virtuality)),
                span: m.name.span,
            });
        }

        let id = self.ctx.program.add_method(MethodEntry {
            id: MethodId(0),
            name: name.to_string(),
            owner: class,
            visibility: m.modifiers.visibility(),
            kind: if is_static { MethodKind::Static } else { MethodKind::Instance },
            virtuality,
            return_type,
            params,
            signature,
            overrides: None,
            locals: Vec::new(),
            body: None,
            span: m.name.span,
        });
        if let Some(body) = m.body {
            self.ctx.bodies.push((id, body));
        }
        self.output.methods += 1;
        Ok(())
    }

    // ==========================================================================
    // Signatures
    // ==========================================================================

    fn return_type(
        &mut self,
        ty: &TypeExpr<'_>,
        class: Option<ClassId>,
    ) -> Result<Type, ResolveError> {
        let resolved = self.ctx.resolve_type(ty, class)?;
        if resolved.fixed_len().is_some() {
            return Err(ResolveError::type_mismatch(
                ty.span,
                "a method cannot return a fixed-length array",
            ));
        }
        Ok(resolved)
    }

    fn params(&mut self, params: &[Param<'_>], class: Option<ClassId>) -> Result<Vec<ParamEntry>, ResolveError> {
        let mut out: Vec<ParamEntry> = Vec::with_capacity(params.len());
        for p in params {
            let name = p.name.name;
            if out.iter().any(|other| other.name == name) {
                return Err(ResolveError::duplicate(p.name.span, name));
            }
            let ty = self.ctx.resolve_type(&p.ty, class)?;
            if ty.is_void() {
                return Err(ResolveError::type_mismatch(p.ty.span, format!("parameter {name} cannot be void")));
            }
            if ty.fixed_len().is_some() {
                return Err(ResolveError::type_mismatch(
                    p.ty.span,
                    format!("parameter {name} cannot be a fixed-length array"),
                ));
            }
            out.push(ParamEntry {
                name: name.to_string(),
                ty,
                span: p.name.span,
            });
        }
        Ok(out)
    }
}

fn display_params(program: &Program, types: &[Type]) -> String {
    types.iter().map(|t| t.display(program).to_string()).collect::<Vec<_>>().join(", ")
}

fn virtuality_keyword(virtuality: Virtuality) -> &'static str {
    match virtuality {
        Virtuality::None => "",
        Virtuality::Virtual => "virtual",
        Virtuality::Override => "override",
        Virtuality::Abstract => "abstract",
    }
}

