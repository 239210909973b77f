//! Driver configuration and project description

use crate::error::DriverError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Treat every module as stale
    #[serde(default)]
    pub force_regen: bool,

    /// Extension of source files under the project's source root
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Directory holding one upstream dump directory per module
    #[serde(default = "default_dumps_dir")]
    pub dumps_dir: PathBuf,

    /// Root of the generated code tree
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Extension of generated files
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

fn default_source_extension() -> String {
    "purs".to_string()
}

fn default_dumps_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_output_extension() -> String {
    "go".to_string()
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            force_regen: false,
            source_extension: default_source_extension(),
            dumps_dir: default_dumps_dir(),
            output_dir: default_output_dir(),
            output_extension: default_output_extension(),
        }
    }
}

impl DriverConfig {
    /// Parse settings from TOML; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, DriverError> {
        toml::from_str(text).map_err(|err| DriverError::Config {
            message: err.to_string(),
        })
    }
}

/// What the driver needs to know about the project being translated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project name
    pub name: String,

    /// Dependency name → version requirement
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// Repository URL
    #[serde(default)]
    pub repository: Option<String>,

    /// Directory holding the project's source files
    pub source_root: PathBuf,
}

impl ProjectInfo {
    /// A project with no dependencies
    pub fn new(name: impl Into<String>, source_root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dependencies: IndexMap::new(),
            repository: None,
            source_root: source_root.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DriverConfig::from_toml_str("").unwrap();
        assert_eq!(config, DriverConfig::default());
        assert!(!config.force_regen);
    }

    #[test]
    fn test_config_overrides() {
        let config = DriverConfig::from_toml_str(
            r#"
            force_regen = true
            dumps_dir = "build/dumps"
            output_extension = "txt"
            "#,
        )
        .unwrap();

        assert!(config.force_regen);
        assert_eq!(config.dumps_dir, PathBuf::from("build/dumps"));
        assert_eq!(config.output_extension, "txt");
        assert_eq!(config.source_extension, "purs");
    }

    #[test]
    fn test_config_rejects_bad_types() {
        let err = DriverConfig::from_toml_str("force_regen = \"yes\"").unwrap_err();
        assert!(matches!(err, DriverError::Config { .. }));
    }
}
