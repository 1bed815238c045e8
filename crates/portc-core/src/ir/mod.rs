//! Typed intermediate representation of method bodies.
//!
//! Every expression node carries its resolved [`Type`](crate::Type); implicit
//! conversions appear as explicit [`ExprKind::Coerce`] nodes and every call
//! names its target method and dispatch mode, so code generators never make
//! typing decisions of their own.

mod expr;
mod stmt;

pub use expr::{CoercionKind, Dispatch, Expr, ExprKind, Receiver};
pub use stmt::{Block, Stmt, StmtKind, SwitchCase};
