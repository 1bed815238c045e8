//! Resolver passes.
//!
//! Each pass runs to completion over the whole program before the next one
//! starts:
//!
//! - [`declarations`]: register every class, enum and delegate name
//! - [`hierarchy`]: link base classes and order classes by depth
//! - [`members`]: register fields, constants, methods and signatures
//! - [`overrides`]: validate `override`, `abstract` and hiding rules
//! - [`bodies`]: type check every method body into IR
//! - [`flow`]: reachability, definite assignment and return checks

pub mod bodies;
pub mod declarations;
pub mod flow;
pub mod hierarchy;
pub mod members;
pub mod overrides;

pub use bodies::BodyPass;
pub use declarations::DeclarationPass;
pub use flow::FlowPass;
pub use hierarchy::HierarchyPass;
pub use members::MemberPass;
pub use overrides::OverridePass;
