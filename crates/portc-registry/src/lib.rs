//! The program model: owning storage for every symbol of one compilation.
//!
//! The resolver registers declarations into a [`Program`], links the class
//! hierarchy and fills in types, constants and method bodies. Once
//! resolution completes the program is only ever borrowed immutably.

mod hierarchy;
mod program;

pub use program::{GlobalSymbol, Program, ResourceEntry};
