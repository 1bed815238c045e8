//! Front end of the portc compiler.
//!
//! Source text goes through three stages before it becomes a [`Script`]:
//!
//! 1. [`preprocess`] evaluates `#if`/`#elif`/`#else`/`#endif` against the
//!    compilation's [`DefineSet`](portc_core::DefineSet), blanking inactive
//!    lines so line numbers are preserved.
//! 2. The lexer and the expanding token stream turn the text into tokens,
//!    substituting `macro` invocations and recording each expansion in the
//!    [`SourceMap`](portc_core::SourceMap).
//! 3. The recursive-descent [`Parser`] builds an arena-allocated syntax tree.
//!
//! [`ParseSession`] ties the stages together for a multi-file compilation.

pub mod ast;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod preprocess;
pub mod session;

pub use ast::*;
pub use macros::{Macro, MacroTable};
pub use parser::Parser;
pub use preprocess::preprocess;
pub use session::ParseSession;
