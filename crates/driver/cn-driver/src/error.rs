//! Driver errors

use cn_raw::TranslateError;
use miette::Diagnostic;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reading or writing a cached artifact failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("cache I/O failed for `{}`: {message}", .path.display())]
#[diagnostic(code(driver::cache_io))]
pub struct CacheIoError {
    /// Artifact path
    pub path: PathBuf,
    /// Underlying failure
    pub message: String,
}

impl CacheIoError {
    /// Attach a path to an I/O or serialization failure
    pub fn new(path: &Path, err: impl Display) -> Self {
        Self {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Why a single module could not be processed
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ModuleError {
    /// Decoding, normalization, lowering or resolution failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Translate(#[from] TranslateError),

    /// The raw input artifact could not be read
    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] CacheIoError),
}

/// One failed module of a batch
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("module `{module}`: {error}")]
#[diagnostic(code(driver::module_failed))]
pub struct ModuleFailure {
    /// Qualified module name
    pub module: String,
    /// Cause
    #[diagnostic_source]
    pub error: ModuleError,
}

impl ModuleFailure {
    /// Tag a failure with its module
    pub fn new(module: impl Into<String>, error: impl Into<ModuleError>) -> Self {
        Self {
            module: module.into(),
            error: error.into(),
        }
    }
}

/// Errors that stop a run
#[derive(Error, Debug, Diagnostic)]
pub enum DriverError {
    /// At least one module of a batch failed; every failure is listed
    #[error("translation failed for {}", module_list(.failures))]
    #[diagnostic(
        code(driver::batch_failed),
        help("fix the listed modules and run again; metadata already written is kept")
    )]
    BatchFailed {
        /// Every failed module, in module order
        #[related]
        failures: Vec<ModuleFailure>,
    },

    /// Writing a cached artifact failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    CacheIo(#[from] CacheIoError),

    /// The source tree could not be enumerated
    #[error("cannot read source directory `{}`: {message}", .path.display())]
    #[diagnostic(code(driver::discovery))]
    Discovery {
        /// Directory being read
        path: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// Driver configuration could not be parsed
    #[error("invalid driver configuration: {message}")]
    #[diagnostic(code(driver::config))]
    Config {
        /// Parser message
        message: String,
    },
}

impl DriverError {
    /// The failed modules, if this is a batch failure
    pub fn failures(&self) -> &[ModuleFailure] {
        match self {
            Self::BatchFailed { failures } => failures,
            _ => &[],
        }
    }
}

fn module_list(failures: &[ModuleFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("`{}`", failure.module))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_raw::StructuralError;

    #[test]
    fn test_batch_failure_lists_every_module() {
        let err = DriverError::BatchFailed {
            failures: vec![
                ModuleFailure::new("A", TranslateError::from(StructuralError::NestedComment)),
                ModuleFailure::new(
                    "B.C",
                    CacheIoError::new(Path::new("dumps/B.C/coreimp.json"), "gone"),
                ),
            ],
        };

        assert_eq!(err.to_string(), "translation failed for `A`, `B.C`");
        assert_eq!(err.failures().len(), 2);
        assert_eq!(
            err.failures()[1].to_string(),
            "module `B.C`: cache I/O failed for `dumps/B.C/coreimp.json`: gone"
        );
    }

    #[test]
    fn test_batch_failure_help_mentions_kept_metadata() {
        let err = DriverError::BatchFailed {
            failures: vec![ModuleFailure::new(
                "Main",
                TranslateError::from(StructuralError::NestedComment),
            )],
        };

        let help = err.help().map(|help| help.to_string());
        assert_eq!(
            help.as_deref(),
            Some("fix the listed modules and run again; metadata already written is kept")
        );
        let code = err.code().map(|code| code.to_string());
        assert_eq!(code.as_deref(), Some("driver::batch_failed"));
    }
}
