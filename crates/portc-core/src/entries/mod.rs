//! Registered symbols.
//!
//! The resolver fills a program model with these entries; later phases read
//! them by id.

mod class;
mod common;
mod constant;
mod delegate;
mod enum_entry;
mod method;

pub use class::{ClassEntry, FieldEntry};
pub use common::Visibility;
pub use constant::{ConstEntry, ConstOwner};
pub use delegate::DelegateEntry;
pub use enum_entry::{EnumEntry, EnumValueEntry};
pub use method::{LocalEntry, MethodEntry, MethodKind, ParamEntry, Virtuality};
