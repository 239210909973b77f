//! Indexed arena storage for raw and GIR trees
//!
//! Both tree layers keep their nodes in one arena per module and express
//! parent/child links as indices, so back-references never form ownership
//! cycles. This is a re-export of `la-arena`.

pub use la_arena::{Arena, ArenaMap, Idx};
