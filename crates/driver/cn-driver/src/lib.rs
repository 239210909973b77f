//! Translation driver
//!
//! Decides which modules of a project need translating, runs the
//! decode → normalize → lower pipeline for them in parallel, builds the
//! module registry, resolves cross-module type references and keeps the
//! per-module metadata cache up to date.
//!
//! The driver never installs a `tracing` subscriber; callers choose how
//! phase spans and per-module events are reported.

pub mod config;
pub mod error;
pub mod layout;
pub mod meta;
pub mod registry;
pub mod scheduler;
pub mod staleness;

pub use config::{DriverConfig, ProjectInfo};
pub use error::{CacheIoError, DriverError, ModuleError, ModuleFailure};
pub use layout::{ArtifactLayout, discover_modules};
pub use meta::{ModuleMeta, ModuleSummary};
pub use registry::{ModuleRegistry, RegistryEntry};
pub use scheduler::{Driver, ModuleReport, RunReport, WritePass, translate_module};
pub use staleness::{StaleReason, Staleness, check_staleness};
