use crate::ir::Block;
use crate::{ClassId, MethodId, SignatureHash, Span, Type, Visibility};

/// How a method participates in dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Virtuality {
    #[default]
    None,
    Virtual,
    Override,
    Abstract,
}

impl Virtuality {
    /// Whether calls through an object must go through the dispatch table.
    pub fn is_dispatched(self) -> bool {
        !matches!(self, Virtuality::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Instance,
    Static,
    Constructor,
}

/// A method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry {
    pub id: MethodId,
    pub name: String,
    pub owner: ClassId,
    pub visibility: Visibility,
    pub kind: MethodKind,
    pub virtuality: Virtuality,
    pub return_type: Type,
    pub params: Vec<ParamEntry>,
    pub signature: SignatureHash,
    /// The base-class method an `override` replaces.
    pub overrides: Option<MethodId>,
    /// Every local declared in the body, indexed by `LocalId`.
    pub locals: Vec<LocalEntry>,
    /// Resolved body; `None` for abstract methods and before resolution.
    pub body: Option<Block>,
    pub span: Span,
}

impl MethodEntry {
    pub fn is_static(&self) -> bool {
        self.kind == MethodKind::Static
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalEntry {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}
