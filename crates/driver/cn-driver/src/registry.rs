//! Module registry
//!
//! Built once per run after the first batch and never mutated afterwards;
//! the resolution batch reads it from every worker thread.

use cn_gir_lower::ModuleLookup;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What the registry knows about one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Qualified module name
    pub qualified_name: String,
    /// Generated code path
    pub output_path: PathBuf,
    /// Regenerated during this run
    pub stale: bool,
    /// Cached metadata path
    pub metadata_path: PathBuf,
    /// Cached GIR dump path
    pub gir_cache_path: PathBuf,
    /// Exported names
    pub exports: BTreeSet<String>,
}

/// Frozen table of every module in the run
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    entries: FxHashMap<String, RegistryEntry>,
}

impl ModuleRegistry {
    /// Build the registry; a later entry for the same name replaces an earlier one
    pub fn build(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.qualified_name.clone(), entry))
            .collect();
        Self { entries }
    }

    /// Look up a module
    pub fn get(&self, qualified_name: &str) -> Option<&RegistryEntry> {
        self.entries.get(qualified_name)
    }

    /// Export set of a module
    pub fn exports_of(&self, qualified_name: &str) -> Option<&BTreeSet<String>> {
        self.get(qualified_name).map(|entry| &entry.exports)
    }

    /// Number of modules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no modules
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }
}

impl ModuleLookup for ModuleRegistry {
    fn contains_module(&self, qualified_name: &str) -> bool {
        self.entries.contains_key(qualified_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, exports: &[&str]) -> RegistryEntry {
        RegistryEntry {
            qualified_name: name.to_string(),
            output_path: PathBuf::from(format!("out/{name}.go")),
            stale: true,
            metadata_path: PathBuf::from(format!("dumps/{name}/cinder-meta.json")),
            gir_cache_path: PathBuf::from(format!("dumps/{name}/cinder-gir.json")),
            exports: exports.iter().map(|name| name.to_string()).collect(),
        }
    }

    #[test]
    fn test_lookup() {
        let registry = ModuleRegistry::build([
            entry("Main", &["main"]),
            entry("Data.Maybe", &["Just", "Nothing"]),
        ]);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains_module("Data.Maybe"));
        assert!(!registry.contains_module("Data.Either"));
        assert!(registry.exports_of("Data.Maybe").unwrap().contains("Just"));
        assert_eq!(registry.get("Main").unwrap().output_path, PathBuf::from("out/Main.go"));
    }
}
