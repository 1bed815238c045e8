use crate::{DelegateId, ParamEntry, Span, Type};

/// A named function-pointer type.
#[derive(Debug, Clone, PartialEq)]
pub struct DelegateEntry {
    pub id: DelegateId,
    pub name: String,
    pub is_public: bool,
    pub return_type: Type,
    pub params: Vec<ParamEntry>,
    pub span: Span,
}

impl DelegateEntry {
    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params.iter().map(|p| &p.ty)
    }
}
