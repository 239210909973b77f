//! Raw IR → GIR lowering
//!
//! [`lower_module`] turns one normalized [`cn_raw::RawModule`] into a
//! [`cn_gir::GirModule`]. Qualified type checks (`x instanceof M.T`) cannot
//! be resolved while modules are still being lowered, so they are left as
//! [`cn_gir::TypeTarget::Pending`] and rewritten later by [`resolve_module`]
//! against the frozen module registry.

pub mod lower;
pub mod resolve;

pub use lower::{LoweringContext, lower_module};
pub use resolve::{ModuleLookup, ensure_resolved, resolve_module};
