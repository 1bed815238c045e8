//! Syntax tree produced by the parser.
//!
//! All nodes are allocated in a bump arena and borrow from it; the tree is
//! untyped and carries only spans and source text. The resolver turns it into
//! the typed program model.

pub mod decl;
pub mod expr;
pub mod modifiers;
pub mod stmt;
pub mod types;

pub use decl::*;
pub use expr::*;
pub use modifiers::Modifiers;
pub use stmt::*;
pub use types::*;

use portc_core::{SourceId, Span};

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// The declarations of one parsed source file.
#[derive(Debug, Clone, Copy)]
pub struct Script<'ast> {
    items: &'ast [Item<'ast>],
    source: SourceId,
}

impl<'ast> Script<'ast> {
    pub(crate) fn new(items: &'ast [Item<'ast>], source: SourceId) -> Self {
        Self { items, source }
    }

    pub fn items(&self) -> &'ast [Item<'ast>] {
        self.items
    }

    pub fn source(&self) -> SourceId {
        self.source
    }
}
