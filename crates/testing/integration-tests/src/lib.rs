//! Integration test utilities for the Cinder translator
//!
//! [`ProjectFixture`] lays out a throwaway project on disk: source files
//! under `src/`, one upstream dump per module under `output/`, and
//! generated code under `generated/`. [`nodes`] builds upstream JSON
//! documents without spelling out every tag by hand.

pub mod nodes;

use anyhow::{Context, Result};
use cn_driver::{Driver, DriverConfig, DriverError, ProjectInfo, RunReport};
use serde_json::Value;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Age given to upstream dumps so caches written afterwards are newer
const INPUT_AGE: Duration = Duration::from_secs(3600);

/// Route driver logs to the test harness; set `RUST_LOG` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A project on disk
pub struct ProjectFixture {
    /// Keeps the directory alive
    dir: TempDir,
    /// Project description handed to the driver
    pub project: ProjectInfo,
    /// Driver settings
    pub config: DriverConfig,
}

impl ProjectFixture {
    /// Creates an empty project
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created
    pub fn new() -> Result<Self> {
        init_tracing();
        let dir = TempDir::new().context("creating fixture directory")?;
        let project = ProjectInfo::new("fixture", dir.path().join("src"));
        fs::create_dir_all(&project.source_root)?;
        let config = DriverConfig {
            dumps_dir: dir.path().join("output"),
            output_dir: dir.path().join("generated"),
            ..DriverConfig::default()
        };
        Ok(Self { dir, project, config })
    }

    /// Root directory of the project
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A driver for the current settings
    pub fn driver(&self) -> Driver {
        Driver::new(self.config.clone())
    }

    /// Adds a module: its source file and its upstream dump
    ///
    /// The dump is back-dated so caches produced by a later run count as
    /// fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no `moduleName` or a file cannot
    /// be written
    pub fn add_module(&self, document: &Value) -> Result<()> {
        let name = document["moduleName"]
            .as_str()
            .context("document without moduleName")?;

        let source = name
            .split('.')
            .fold(self.project.source_root.clone(), |path, segment| path.join(segment))
            .with_extension(&self.config.source_extension);
        write(&source, &format!("module {name} where\n"))?;

        let dump = self.driver().layout().raw_input(name);
        write(&dump, &serde_json::to_string_pretty(document)?)?;
        set_mtime(&dump, SystemTime::now() - INPUT_AGE)
    }

    /// Marks a module's upstream dump as newer than every cache
    ///
    /// # Errors
    ///
    /// Returns an error if the dump does not exist
    pub fn touch_input(&self, name: &str) -> Result<()> {
        set_mtime(&self.driver().layout().raw_input(name), SystemTime::now() + INPUT_AGE)
    }

    /// Discovers and runs every module
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged
    pub fn run(&self) -> Result<RunReport, DriverError> {
        self.driver().run_project(&self.project)
    }

    /// Writes the artifacts an emitter would produce for regenerated modules
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written
    pub fn emit(&self, report: &RunReport) -> Result<()> {
        let driver = self.driver();
        let layout = driver.layout();
        for module in &report.modules {
            if let Some(gir) = &module.gir {
                write(&layout.gir_cache(&module.qualified_name), &cn_gir::pretty_print(gir))?;
                write(
                    &layout.generated_output(&module.qualified_name),
                    &format!("// generated from {}\n", module.qualified_name),
                )?;
            }
        }
        Ok(())
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

fn set_mtime(path: &Path, time: SystemTime) -> Result<()> {
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(time))
        .with_context(|| format!("setting mtime of {}", path.display()))
}
