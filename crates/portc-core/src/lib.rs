//! Shared vocabulary for the portc compiler.
//!
//! Spans and source maps, the semantic type model, constant values, the
//! registered symbol entries, the typed IR and every phase's error type live
//! here so that the parser, resolver, lowering and code generators agree on
//! one set of definitions.

mod defines;
mod diagnostics;
pub mod entries;
mod error;
mod ids;
pub mod ir;
mod ops;
mod signature;
mod source_map;
mod span;
mod types;
mod value;

pub use defines::{DefineSet, TRUE_SYMBOL};
pub use diagnostics::{Diagnostic, Severity};
pub use entries::*;
pub use error::{
    CompileError, ParseError, ParseErrorKind, ReservedSymbol, ResolveError, ResolveErrorKind,
    ResolveFailure, ResourceError,
};
pub use ids::{
    ClassId, ConstId, DelegateId, EnumId, FieldId, LocalId, MethodId, ResourceId, SymbolRef,
};
pub use ops::{AssignOp, BinaryOp, IncDecOp, UnaryOp};
pub use signature::SignatureHash;
pub use source_map::{Expansion, SourceFile, SourceMap};
pub use span::{ExpansionId, SourceId, Span};
pub use types::{Type, TypeDisplay, TypeNames};
pub use value::ConstValue;
