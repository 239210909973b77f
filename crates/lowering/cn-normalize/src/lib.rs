//! Normalization of decoded raw modules
//!
//! Runs once per module, before lowering:
//! 1. [`link::link_module`] walks every tree top-down, setting parent and
//!    module links, sanitizing identifiers and unwrapping comment wrappers.
//! 2. [`top_level::rewrite_top_level`] strips the upstream boilerplate,
//!    collects `require` aliases, re-sugars function bindings and rejects
//!    anything else that is not a declaration.

pub mod link;
pub mod top_level;

pub use link::{PRIME_MARKER, link_module, sanitize_identifier};
pub use top_level::{USE_STRICT, rewrite_top_level};

use cn_raw::{RawModule, TranslateError};

/// Normalize a module in place
///
/// On error the module is left partially rewritten and must be discarded.
pub fn normalize_module(module: &mut RawModule) -> Result<(), TranslateError> {
    let _span = tracing::debug_span!("normalize", module = %module.info.qualified_name).entered();
    link_module(module)?;
    rewrite_top_level(module)
}
