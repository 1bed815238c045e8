use crate::{ClassId, ConstId, FieldId, MethodId, Span, Type, Visibility};

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub id: ClassId,
    pub name: String,
    pub is_public: bool,
    pub is_abstract: bool,
    pub is_static: bool,
    pub base: Option<ClassId>,
    /// Number of ancestors; root classes have depth 0.
    pub depth: u32,
    pub fields: Vec<FieldId>,
    pub consts: Vec<ConstId>,
    /// Methods in declaration order, excluding the constructor.
    pub methods: Vec<MethodId>,
    pub constructor: Option<MethodId>,
    pub span: Span,
}

impl ClassEntry {
    pub fn new(id: ClassId, name: impl Into<String>, span: Span) -> Self {
        Self {
            id,
            name: name.into(),
            is_public: false,
            is_abstract: false,
            is_static: false,
            base: None,
            depth: 0,
            fields: Vec::new(),
            consts: Vec::new(),
            methods: Vec::new(),
            constructor: None,
            span,
        }
    }
}

/// An instance field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub id: FieldId,
    pub name: String,
    pub owner: ClassId,
    pub visibility: Visibility,
    pub ty: Type,
    pub span: Span,
}
