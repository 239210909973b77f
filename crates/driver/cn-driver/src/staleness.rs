//! Freshness checks

use crate::layout::ArtifactLayout;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Why a module has to be regenerated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// The force flag is set
    Forced,
    /// A cached artifact does not exist
    MissingArtifact(PathBuf),
    /// The upstream dump is newer than a cached artifact
    InputNewer,
    /// Cached metadata exists but could not be read
    UnreadableCache,
}

/// Outcome of the freshness check for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Every cached artifact is newer than the upstream dump
    Fresh,
    /// The module must be regenerated
    Stale(StaleReason),
}

impl Staleness {
    /// Whether the module must be regenerated
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Decide whether a module's cached artifacts can be reused
///
/// An unreadable upstream dump counts as new so the module gets regenerated
/// and the read error surfaces there.
pub fn check_staleness(layout: &ArtifactLayout, module: &str, force: bool) -> Staleness {
    if force {
        return Staleness::Stale(StaleReason::Forced);
    }

    let mut oldest_cache: Option<SystemTime> = None;
    for artifact in layout.cached_artifacts(module) {
        let Some(time) = modified(&artifact) else {
            return Staleness::Stale(StaleReason::MissingArtifact(artifact));
        };
        oldest_cache = Some(oldest_cache.map_or(time, |oldest| oldest.min(time)));
    }

    match (modified(&layout.raw_input(module)), oldest_cache) {
        (Some(input), Some(oldest)) if input <= oldest => Staleness::Fresh,
        _ => Staleness::Stale(StaleReason::InputNewer),
    }
}
