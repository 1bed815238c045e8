use crate::{EnumId, Span};

/// An enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub id: EnumId,
    pub name: String,
    pub is_public: bool,
    /// Values in declaration order.
    pub values: Vec<EnumValueEntry>,
    pub span: Span,
}

impl EnumEntry {
    pub fn value_index(&self, name: &str) -> Option<u32> {
        self.values
            .iter()
            .position(|v| v.name == name)
            .map(|i| i as u32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueEntry {
    pub name: String,
    pub value: i64,
    pub span: Span,
}
