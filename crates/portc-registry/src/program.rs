//! Program storage.
//!
//! # Storage Model
//!
//! - Every entity kind lives in its own `Vec`, indexed by its typed id.
//! - Classes, enums and delegates share one global namespace keyed by name.
//! - Classes list their members by id; members point back at their class.
//!
//! Ids are handed out densely in registration order, which is declaration
//! order, so iterating any table is deterministic.

use rustc_hash::FxHashMap;

use portc_core::{
    ClassEntry, ClassId, ConstEntry, ConstId, ConstOwner, DelegateEntry, DelegateId, Diagnostic,
    EnumEntry, EnumId, FieldEntry, FieldId, MethodEntry, MethodId, ResolveError, ResourceId, Span,
    SymbolRef, Type, TypeNames,
};

/// A name in the global namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalSymbol {
    Class(ClassId),
    Enum(EnumId),
    Delegate(DelegateId),
}

/// A `BinaryResource` path, recorded at its first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub id: ResourceId,
    pub path: String,
    pub span: Span,
}

/// The whole program being compiled.
#[derive(Debug, Default)]
pub struct Program {
    classes: Vec<ClassEntry>,
    enums: Vec<EnumEntry>,
    delegates: Vec<DelegateEntry>,
    methods: Vec<MethodEntry>,
    fields: Vec<FieldEntry>,
    consts: Vec<ConstEntry>,
    resources: Vec<ResourceEntry>,

    /// Global namespace: class, enum and delegate names.
    globals: FxHashMap<String, GlobalSymbol>,
    /// Top-level declarations in source order.
    declarations: Vec<GlobalSymbol>,

    /// Non-fatal diagnostics, in the order they were found.
    warnings: Vec<Diagnostic>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    fn declare(&mut self, name: &str, span: Span, symbol: GlobalSymbol) -> Result<(), ResolveError> {
        if self.globals.contains_key(name) {
            return Err(ResolveError::duplicate(span, name));
        }
        self.globals.insert(name.to_string(), symbol);
        self.declarations.push(symbol);
        Ok(())
    }

    /// Register a class name; fails with `DuplicateSymbol` on a clash.
    pub fn register_class(&mut self, name: &str, span: Span) -> Result<ClassId, ResolveError> {
        let id = ClassId::from_index(self.classes.len());
        self.declare(name, span, GlobalSymbol::Class(id))?;
        self.classes.push(ClassEntry::new(id, name, span));
        Ok(id)
    }

    /// Register an enum name; values are filled in during member resolution.
    pub fn register_enum(&mut self, name: &str, span: Span) -> Result<EnumId, ResolveError> {
        let id = EnumId::from_index(self.enums.len());
        self.declare(name, span, GlobalSymbol::Enum(id))?;
        self.enums.push(EnumEntry {
            id,
            name: name.to_string(),
            is_public: false,
            values: Vec::new(),
            span,
        });
        Ok(id)
    }

    /// Register a delegate name; its signature is filled in later.
    pub fn register_delegate(&mut self, name: &str, span: Span) -> Result<DelegateId, ResolveError> {
        let id = DelegateId::from_index(self.delegates.len());
        self.declare(name, span, GlobalSymbol::Delegate(id))?;
        self.delegates.push(DelegateEntry {
            id,
            name: name.to_string(),
            is_public: false,
            return_type: Type::Void,
            params: Vec::new(),
            span,
        });
        Ok(id)
    }

    /// Add a field to its owning class. The entry's id is assigned here.
    pub fn add_field(&mut self, mut entry: FieldEntry) -> FieldId {
        let id = FieldId::from_index(self.fields.len());
        entry.id = id;
        self.classes[entry.owner.index()].fields.push(id);
        self.fields.push(entry);
        id
    }

    /// Add a named constant. Class constants are listed on their class.
    pub fn add_const(&mut self, mut entry: ConstEntry) -> ConstId {
        let id = ConstId::from_index(self.consts.len());
        entry.id = id;
        if let ConstOwner::Class(owner) = entry.owner {
            self.classes[owner.index()].consts.push(id);
        }
        self.consts.push(entry);
        id
    }

    /// Add a method or constructor to its owning class.
    pub fn add_method(&mut self, mut entry: MethodEntry) -> MethodId {
        let id = MethodId::from_index(self.methods.len());
        entry.id = id;
        let class = &mut self.classes[entry.owner.index()];
        if entry.is_constructor() {
            class.constructor = Some(id);
        } else {
            class.methods.push(id);
        }
        self.methods.push(entry);
        id
    }

    /// Record a resource path, returning the existing id if already used.
    pub fn add_resource(&mut self, path: &str, span: Span) -> ResourceId {
        if let Some(existing) = self.resources.iter().find(|r| r.path == path) {
            return existing.id;
        }
        let id = ResourceId::from_index(self.resources.len());
        self.resources.push(ResourceEntry {
            id,
            path: path.to_string(),
            span,
        });
        id
    }

    pub fn add_warning(&mut self, warning: Diagnostic) {
        self.warnings.push(warning);
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    pub fn lookup_global(&self, name: &str) -> Option<GlobalSymbol> {
        self.globals.get(name).copied()
    }

    /// Top-level declarations in source order.
    pub fn declarations(&self) -> &[GlobalSymbol] {
        &self.declarations
    }

    pub fn class(&self, id: ClassId) -> &ClassEntry {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassEntry {
        &mut self.classes[id.index()]
    }

    pub fn classes(&self) -> &[ClassEntry] {
        &self.classes
    }

    pub fn enum_entry(&self, id: EnumId) -> &EnumEntry {
        &self.enums[id.index()]
    }

    pub fn enum_mut(&mut self, id: EnumId) -> &mut EnumEntry {
        &mut self.enums[id.index()]
    }

    pub fn enums(&self) -> &[EnumEntry] {
        &self.enums
    }

    pub fn delegate(&self, id: DelegateId) -> &DelegateEntry {
        &self.delegates[id.index()]
    }

    pub fn delegate_mut(&mut self, id: DelegateId) -> &mut DelegateEntry {
        &mut self.delegates[id.index()]
    }

    pub fn delegates(&self) -> &[DelegateEntry] {
        &self.delegates
    }

    pub fn method(&self, id: MethodId) -> &MethodEntry {
        &self.methods[id.index()]
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodEntry {
        &mut self.methods[id.index()]
    }

    pub fn methods(&self) -> &[MethodEntry] {
        &self.methods
    }

    pub fn field(&self, id: FieldId) -> &FieldEntry {
        &self.fields[id.index()]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut FieldEntry {
        &mut self.fields[id.index()]
    }

    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    pub fn const_entry(&self, id: ConstId) -> &ConstEntry {
        &self.consts[id.index()]
    }

    pub fn const_mut(&mut self, id: ConstId) -> &mut ConstEntry {
        &mut self.consts[id.index()]
    }

    pub fn consts(&self) -> &[ConstEntry] {
        &self.consts
    }

    pub fn resource(&self, id: ResourceId) -> &ResourceEntry {
        &self.resources[id.index()]
    }

    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Qualified display name of a method: `Class.Method`.
    pub fn method_path(&self, id: MethodId) -> String {
        let method = self.method(id);
        format!("{}.{}", self.class(method.owner).name, method.name)
    }

    /// `Name(int, long)`, used in overload diagnostics.
    pub fn method_signature_display(&self, id: MethodId) -> String {
        let method = self.method(id);
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| p.ty.display(self).to_string())
            .collect();
        format!("{}({})", method.name, params.join(", "))
    }

    /// The declared type of a symbol, where it has one.
    pub fn type_of(&self, symbol: SymbolRef) -> Option<Type> {
        match symbol {
            SymbolRef::Class(id) => Some(Type::Class(id)),
            SymbolRef::Enum(id) | SymbolRef::EnumValue(id, _) => Some(Type::Enum(id)),
            SymbolRef::Delegate(id) => Some(Type::Delegate(id)),
            SymbolRef::Field(id) => Some(self.field(id).ty.clone()),
            SymbolRef::Const(id) => Some(self.const_entry(id).ty.clone()),
            SymbolRef::Method(id) => Some(self.method(id).return_type.clone()),
            SymbolRef::Parameter(method, index) => self
                .method(method)
                .params
                .get(index as usize)
                .map(|p| p.ty.clone()),
            SymbolRef::Local(method, local) => self
                .method(method)
                .locals
                .get(local.index())
                .map(|l| l.ty.clone()),
        }
    }
}

impl TypeNames for Program {
    fn class_name(&self, id: ClassId) -> &str {
        &self.class(id).name
    }

    fn enum_name(&self, id: EnumId) -> &str {
        &self.enum_entry(id).name
    }

    fn delegate_name(&self, id: DelegateId) -> &str {
        &self.delegate(id).name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portc_core::{MethodKind, ParamEntry, ResolveErrorKind, SignatureHash, Virtuality, Visibility};

    fn method_entry(owner: ClassId, name: &str, params: Vec<Type>) -> MethodEntry {
        MethodEntry {
            id: MethodId(0),
            name: name.to_string(),
            owner,
            visibility: Visibility::Public,
            kind: MethodKind::Instance,
            virtuality: Virtuality::None,
            return_type: Type::Void,
            signature: SignatureHash::of(name, &params),
            params: params
                .into_iter()
                .enumerate()
                .map(|(i, ty)| ParamEntry {
                    name: format!("p{i}"),
                    ty,
                    span: Span::default(),
                })
                .collect(),
            overrides: None,
            locals: Vec::new(),
            body: None,
            span: Span::default(),
        }
    }

    #[test]
    fn global_names_are_unique_across_kinds() {
        let mut program = Program::new();
        program.register_class("Shape", Span::new(1, 1, 5)).unwrap();
        let err = program.register_enum("Shape", Span::new(7, 1, 5)).unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::DuplicateSymbol);
        assert_eq!(err.span().line, 7);
        assert_eq!(program.declarations().len(), 1);
    }

    #[test]
    fn members_are_listed_on_their_class() {
        let mut program = Program::new();
        let class = program.register_class("A", Span::default()).unwrap();
        let field = program.add_field(FieldEntry {
            id: FieldId(0),
            name: "x".into(),
            owner: class,
            visibility: Visibility::Private,
            ty: Type::Int,
            span: Span::default(),
        });
        let method = program.add_method(method_entry(class, "Run", vec![Type::Int, Type::Long]));
        let mut ctor = method_entry(class, "A", vec![]);
        ctor.kind = MethodKind::Constructor;
        let ctor = program.add_method(ctor);

        let entry = program.class(class);
        assert_eq!(entry.fields, vec![field]);
        assert_eq!(entry.methods, vec![method]);
        assert_eq!(entry.constructor, Some(ctor));
        assert_eq!(program.method_path(method), "A.Run");
        assert_eq!(program.method_signature_display(method), "Run(int, long)");
        assert_eq!(program.type_of(SymbolRef::Parameter(method, 1)), Some(Type::Long));
    }

    #[test]
    fn resources_are_deduplicated() {
        let mut program = Program::new();
        let a = program.add_resource("a.bin", Span::new(1, 1, 1));
        let b = program.add_resource("b.bin", Span::new(2, 1, 1));
        let again = program.add_resource("a.bin", Span::new(3, 1, 1));
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(program.resources().len(), 2);
        assert_eq!(program.resource(a).span.line, 1);
    }
}
