//! Artifact paths and module discovery

use crate::config::{DriverConfig, ProjectInfo};
use crate::error::DriverError;
use std::fs;
use std::path::{Path, PathBuf};

/// Upstream dump of one module
pub const RAW_ARTIFACT: &str = "coreimp.json";
/// Module metadata written by the driver
pub const META_ARTIFACT: &str = "cinder-meta.json";
/// GIR dump written next to the generated code
pub const GIR_ARTIFACT: &str = "cinder-gir.json";

/// Where each artifact of a module lives
///
/// ```text
/// <dumps>/<qname>/coreimp.json
/// <dumps>/<qname>/cinder-meta.json
/// <dumps>/<qname>/cinder-gir.json
/// <out>/<qname as dirs>/<leaf>.<ext>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    dumps_dir: PathBuf,
    output_dir: PathBuf,
    output_extension: String,
}

impl ArtifactLayout {
    /// Layout described by a driver configuration
    pub fn from_config(config: &DriverConfig) -> Self {
        Self {
            dumps_dir: config.dumps_dir.clone(),
            output_dir: config.output_dir.clone(),
            output_extension: config.output_extension.clone(),
        }
    }

    /// Upstream dump of a module
    pub fn raw_input(&self, module: &str) -> PathBuf {
        self.dumps_dir.join(module).join(RAW_ARTIFACT)
    }

    /// Cached metadata of a module
    pub fn metadata(&self, module: &str) -> PathBuf {
        self.dumps_dir.join(module).join(META_ARTIFACT)
    }

    /// Cached GIR dump of a module
    pub fn gir_cache(&self, module: &str) -> PathBuf {
        self.dumps_dir.join(module).join(GIR_ARTIFACT)
    }

    /// Generated code for a module, one package directory per module:
    /// `Data.Maybe` → `<out>/Data/Maybe/Maybe.<ext>`
    pub fn generated_output(&self, module: &str) -> PathBuf {
        let mut path = self.output_dir.clone();
        for segment in module.split('.') {
            path.push(segment);
        }
        let leaf = module.rsplit('.').next().unwrap_or(module);
        path.push(leaf);
        path.set_extension(&self.output_extension);
        path
    }

    /// Every cached artifact the freshness check needs
    pub fn cached_artifacts(&self, module: &str) -> [PathBuf; 3] {
        [
            self.metadata(module),
            self.gir_cache(module),
            self.generated_output(module),
        ]
    }
}

/// Qualified names of every source module that has an upstream dump
///
/// Source files are found recursively under the project's source root; the
/// qualified name is the relative path without extension, with path
/// separators replaced by `.`. The result is sorted.
pub fn discover_modules(
    project: &ProjectInfo,
    config: &DriverConfig,
    layout: &ArtifactLayout,
) -> Result<Vec<String>, DriverError> {
    let mut modules = Vec::new();
    let root = &project.source_root;
    collect_sources(root, root, &config.source_extension, &mut modules)?;
    modules.retain(|module| layout.raw_input(module).is_file());
    modules.sort();
    modules.dedup();
    Ok(modules)
}

fn collect_sources(
    root: &Path,
    dir: &Path,
    extension: &str,
    modules: &mut Vec<String>,
) -> Result<(), DriverError> {
    let discovery_error = |err: std::io::Error| DriverError::Discovery {
        path: dir.to_path_buf(),
        message: err.to_string(),
    };

    for entry in fs::read_dir(dir).map_err(discovery_error)? {
        let path = entry.map_err(discovery_error)?.path();
        if path.is_dir() {
            collect_sources(root, &path, extension, modules)?;
        } else if path.extension().is_some_and(|ext| ext == extension) {
            if let Some(module) = qualified_name(root, &path) {
                modules.push(module);
            }
        }
    }
    Ok(())
}

fn qualified_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let segments: Vec<&str> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(segments.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_artifact_paths() {
        let config = DriverConfig {
            dumps_dir: PathBuf::from("dumps"),
            output_dir: PathBuf::from("out"),
            output_extension: "go".to_string(),
            ..DriverConfig::default()
        };
        let layout = ArtifactLayout::from_config(&config);

        assert_eq!(layout.raw_input("Data.Maybe"), Path::new("dumps/Data.Maybe/coreimp.json"));
        assert_eq!(layout.metadata("Data.Maybe"), Path::new("dumps/Data.Maybe/cinder-meta.json"));
        assert_eq!(layout.gir_cache("Data.Maybe"), Path::new("dumps/Data.Maybe/cinder-gir.json"));
        assert_eq!(layout.generated_output("Data.Maybe"), Path::new("out/Data/Maybe/Maybe.go"));
        assert_eq!(layout.generated_output("Main"), Path::new("out/Main/Main.go"));
    }

    #[test]
    fn test_discover_modules_with_dumps() {
        let dir = TempDir::new().unwrap();
        let config = DriverConfig {
            dumps_dir: dir.path().join("dumps"),
            output_dir: dir.path().join("out"),
            ..DriverConfig::default()
        };
        let layout = ArtifactLayout::from_config(&config);
        let project = ProjectInfo::new("demo", dir.path().join("src"));

        touch(&dir.path().join("src/Main.purs"));
        touch(&dir.path().join("src/Data/Maybe.purs"));
        touch(&dir.path().join("src/Data/Unused.purs"));
        touch(&dir.path().join("src/Data/notes.txt"));
        touch(&layout.raw_input("Main"));
        touch(&layout.raw_input("Data.Maybe"));

        let modules = discover_modules(&project, &config, &layout).unwrap();
        assert_eq!(modules, ["Data.Maybe", "Main"]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = TempDir::new().unwrap();
        let config = DriverConfig::default();
        let layout = ArtifactLayout::from_config(&config);
        let project = ProjectInfo::new("demo", dir.path().join("missing"));

        let err = discover_modules(&project, &config, &layout).unwrap_err();
        assert!(matches!(err, DriverError::Discovery { .. }));
    }
}
