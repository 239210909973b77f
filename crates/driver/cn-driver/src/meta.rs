//! Per-module metadata cache

use crate::error::CacheIoError;
use cn_gir::{GirKind, GirModule};
use cn_raw::{ImportAlias, RawModule};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Shape of a module's top level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    /// Named functions
    pub functions: Vec<String>,
    /// Named functions declared under an uppercase name
    pub type_level_functions: Vec<String>,
    /// Top-level bindings
    pub values: Vec<String>,
    /// Free-standing comment groups
    pub comment_groups: usize,
}

impl ModuleSummary {
    /// Summarize the top level of a GIR tree
    pub fn of(gir: &GirModule) -> Self {
        let mut summary = Self::default();
        for &id in &gir.body {
            match gir.kind(id) {
                GirKind::FuncDecl {
                    name: Some(name),
                    was_type_level,
                    ..
                } => {
                    if *was_type_level {
                        summary.type_level_functions.push(name.clone());
                    } else {
                        summary.functions.push(name.clone());
                    }
                }
                GirKind::Let { name, .. } => summary.values.push(name.clone()),
                GirKind::CommentGroup => summary.comment_groups += 1,
                _ => {}
            }
        }
        summary
    }
}

/// Cached facts about one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMeta {
    /// Qualified module name
    pub qualified_name: String,
    /// Exported names
    pub exports: BTreeSet<String>,
    /// Imported modules
    pub imports: Vec<ImportAlias>,
    /// Foreign `require` aliases (alias → path)
    pub requires: IndexMap<String, String>,
    /// Top-level shape
    pub summary: ModuleSummary,
    /// Modules named by resolved qualified type checks
    pub referenced_modules: BTreeSet<String>,
    /// Needs writing back
    #[serde(skip)]
    pub dirty: bool,
}

impl ModuleMeta {
    /// Fresh metadata for a regenerated module, marked dirty
    pub fn derive(raw: &RawModule, gir: &GirModule) -> Self {
        Self {
            qualified_name: raw.info.qualified_name.clone(),
            exports: raw.info.exports.clone(),
            imports: raw.imports.clone(),
            requires: raw.requires.clone(),
            summary: ModuleSummary::of(gir),
            referenced_modules: BTreeSet::new(),
            dirty: true,
        }
    }

    /// Read cached metadata
    pub fn load(path: &Path) -> Result<Self, CacheIoError> {
        let text = fs::read_to_string(path).map_err(|err| CacheIoError::new(path, err))?;
        serde_json::from_str(&text).map_err(|err| CacheIoError::new(path, err))
    }

    /// Write metadata, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), CacheIoError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| CacheIoError::new(path, err))?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|err| CacheIoError::new(path, err))?;
        fs::write(path, text).map_err(|err| CacheIoError::new(path, err))
    }

    /// Record the modules resolution referred to; marks dirty on change
    pub fn merge_referenced(&mut self, referenced: BTreeSet<String>) {
        if self.referenced_modules != referenced {
            self.referenced_modules = referenced;
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_raw::{ModuleId, decode_module};
    use tempfile::TempDir;

    fn translated(json: &str) -> (RawModule, GirModule) {
        let mut raw = decode_module(ModuleId(0), json).unwrap();
        cn_normalize::normalize_module(&mut raw).unwrap();
        let gir = cn_gir_lower::lower_module(&raw).unwrap();
        (raw, gir)
    }

    const MODULE: &str = r#"{"moduleName": "Data.Box", "exports": ["Box", "unbox"],
        "imports": [["Prelude"]], "body": [
        {"tag": "StringLiteral", "StringLiteral": "use strict"},
        {"tag": "VariableIntroduction", "VariableIntroduction": "$foreign",
         "rhs": {"tag": "App", "App": {"tag": "Var", "Var": "require"},
                 "args": [{"tag": "StringLiteral", "StringLiteral": "./foreign.js"}]}},
        {"tag": "Comment", "Comment": [{"LineComment": " boxes"}]},
        {"tag": "Function", "Function": "Box", "params": ["value0"], "body": {"tag": "Block", "Block": []}},
        {"tag": "VariableIntroduction", "VariableIntroduction": "unbox",
         "rhs": {"tag": "Function", "params": ["b"], "body": {"tag": "Block", "Block": []}}},
        {"tag": "VariableIntroduction", "VariableIntroduction": "empty",
         "rhs": {"tag": "ArrayLiteral", "ArrayLiteral": []}}
    ]}"#;

    #[test]
    fn test_derive_summarizes_top_level() {
        let (raw, gir) = translated(MODULE);
        let meta = ModuleMeta::derive(&raw, &gir);

        assert!(meta.dirty);
        assert_eq!(meta.qualified_name, "Data.Box");
        assert_eq!(meta.requires.get("$foreign").map(String::as_str), Some("./foreign.js"));
        assert_eq!(
            meta.summary,
            ModuleSummary {
                functions: vec!["unbox".to_string()],
                type_level_functions: vec!["Box".to_string()],
                values: vec!["empty".to_string()],
                comment_groups: 1,
            }
        );
    }

    #[test]
    fn test_save_and_load_clear_dirty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Data.Box").join("cinder-meta.json");
        let (raw, gir) = translated(MODULE);
        let meta = ModuleMeta::derive(&raw, &gir);

        meta.save(&path).unwrap();
        let loaded = ModuleMeta::load(&path).unwrap();

        assert!(!loaded.dirty);
        assert_eq!(loaded, ModuleMeta { dirty: false, ..meta });
    }

    #[test]
    fn test_load_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cinder-meta.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ModuleMeta::load(&path).unwrap_err();
        assert_eq!(err.path, path);
    }

    #[test]
    fn test_merge_referenced_marks_changes() {
        let mut meta = ModuleMeta::default();
        meta.merge_referenced(BTreeSet::new());
        assert!(!meta.dirty);

        meta.merge_referenced(BTreeSet::from(["Data.Maybe".to_string()]));
        assert!(meta.dirty);
    }
}
