//! Run orchestration
//!
//! A run goes through these phases, each finishing before the next starts:
//!
//! 1. plan: freshness check for every module
//! 2. translate (parallel): stale modules are decoded, normalized and
//!    lowered; fresh modules load their cached metadata
//! 3. registry: built from every module's metadata, then frozen
//! 4. first write-back: metadata of regenerated or dirty modules
//! 5. resolve (parallel): qualified type checks of regenerated modules
//! 6. second write-back: metadata that resolution changed
//!
//! Failures of a parallel phase are collected at its barrier and reported
//! together.

use crate::config::{DriverConfig, ProjectInfo};
use crate::error::{CacheIoError, DriverError, ModuleFailure};
use crate::layout::{ArtifactLayout, discover_modules};
use crate::meta::ModuleMeta;
use crate::registry::{ModuleRegistry, RegistryEntry};
use crate::staleness::{StaleReason, Staleness, check_staleness};
use cn_gir::GirModule;
use cn_raw::{ModuleId, TranslateError};
use rayon::prelude::*;
use std::fs;
use tracing::{debug, info, info_span, warn};

/// Decode, normalize and lower one upstream dump
pub fn translate_module(
    id: ModuleId,
    json: &str,
) -> Result<(ModuleMeta, GirModule), TranslateError> {
    let mut raw = cn_raw::decode_module(id, json)?;
    cn_normalize::normalize_module(&mut raw)?;
    let gir = cn_gir_lower::lower_module(&raw)?;
    Ok((ModuleMeta::derive(&raw, &gir), gir))
}

/// What happened to one module
#[derive(Debug, Clone)]
pub struct ModuleReport {
    /// Qualified module name
    pub qualified_name: String,
    /// Freshness verdict that decided the module's fate
    pub staleness: Staleness,
    /// Translated during this run
    pub regenerated: bool,
    /// Current metadata
    pub metadata: ModuleMeta,
    /// Resolved GIR tree, for regenerated modules
    pub gir: Option<GirModule>,
}

/// Outcome of a successful run
#[derive(Debug)]
pub struct RunReport {
    /// One report per module, in input order
    pub modules: Vec<ModuleReport>,
    /// The registry the resolution phase used
    pub registry: ModuleRegistry,
    /// Modules whose metadata the first write-back persisted
    pub first_pass_writes: Vec<String>,
    /// Modules whose metadata the second write-back persisted
    pub again_pass_writes: Vec<String>,
}

impl RunReport {
    /// Report for one module
    pub fn module(&self, qualified_name: &str) -> Option<&ModuleReport> {
        self.modules
            .iter()
            .find(|report| report.qualified_name == qualified_name)
    }

    /// Names of the regenerated modules
    pub fn regenerated(&self) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|report| report.regenerated)
            .map(|report| report.qualified_name.as_str())
            .collect()
    }
}

/// Write-back phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePass {
    /// After the registry is built: regenerated, forced or dirty metadata
    First,
    /// After resolution: dirty metadata only
    Again,
}

/// Translation driver
#[derive(Debug, Clone)]
pub struct Driver {
    config: DriverConfig,
    layout: ArtifactLayout,
}

impl Driver {
    /// Create a driver using the conventional artifact layout
    pub fn new(config: DriverConfig) -> Self {
        let layout = ArtifactLayout::from_config(&config);
        Self { config, layout }
    }

    /// Settings
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Artifact paths
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Discover the project's modules and run them
    pub fn run_project(&self, project: &ProjectInfo) -> Result<RunReport, DriverError> {
        let modules = discover_modules(project, &self.config, &self.layout)?;
        info!(project = %project.name, modules = modules.len(), "discovered modules");
        self.run(&modules)
    }

    /// Run the given modules
    pub fn run(&self, modules: &[String]) -> Result<RunReport, DriverError> {
        let plan: Vec<(&String, Staleness)> = {
            let _span = info_span!("plan", modules = modules.len()).entered();
            let force = self.config.force_regen;
            modules
                .par_iter()
                .map(|module| (module, check_staleness(&self.layout, module, force)))
                .collect()
        };
        let stale = plan.iter().filter(|(_, staleness)| staleness.is_stale()).count();
        info!(stale, fresh = plan.len() - stale, "planned run");

        let mut reports = {
            let _span = info_span!("translate").entered();
            let outcomes: Vec<Result<ModuleReport, ModuleFailure>> = plan
                .into_par_iter()
                .enumerate()
                .map(|(index, (module, staleness))| {
                    let id = ModuleId(u32::try_from(index).unwrap_or(u32::MAX));
                    self.process(id, module, staleness)
                })
                .collect();
            collect_batch(outcomes)?
        };

        let registry = {
            let _span = info_span!("registry").entered();
            ModuleRegistry::build(reports.iter().map(|report| self.registry_entry(report)))
        };

        let first_pass_writes = self.write_back(&mut reports, WritePass::First)?;
        self.resolve(&mut reports, &registry)?;
        let again_pass_writes = self.write_back(&mut reports, WritePass::Again)?;

        Ok(RunReport {
            modules: reports,
            registry,
            first_pass_writes,
            again_pass_writes,
        })
    }

    fn process(
        &self,
        id: ModuleId,
        module: &str,
        staleness: Staleness,
    ) -> Result<ModuleReport, ModuleFailure> {
        if staleness.is_stale() {
            return self.regenerate(id, module, staleness);
        }

        match ModuleMeta::load(&self.layout.metadata(module)) {
            Ok(metadata) => {
                debug!(module, "reusing cached metadata");
                Ok(ModuleReport {
                    qualified_name: module.to_string(),
                    staleness,
                    regenerated: false,
                    metadata,
                    gir: None,
                })
            }
            Err(err) => {
                warn!(module, error = %err, "cached metadata unreadable, regenerating");
                self.regenerate(id, module, Staleness::Stale(StaleReason::UnreadableCache))
            }
        }
    }

    fn regenerate(
        &self,
        id: ModuleId,
        module: &str,
        staleness: Staleness,
    ) -> Result<ModuleReport, ModuleFailure> {
        debug!(module, ?staleness, "regenerating");
        let path = self.layout.raw_input(module);
        let json = fs::read_to_string(&path)
            .map_err(|err| ModuleFailure::new(module, CacheIoError::new(&path, err)))?;
        let (metadata, gir) =
            translate_module(id, &json).map_err(|err| ModuleFailure::new(module, err))?;

        Ok(ModuleReport {
            qualified_name: module.to_string(),
            staleness,
            regenerated: true,
            metadata,
            gir: Some(gir),
        })
    }

    fn registry_entry(&self, report: &ModuleReport) -> RegistryEntry {
        let module = report.qualified_name.as_str();
        RegistryEntry {
            qualified_name: module.to_string(),
            output_path: self.layout.generated_output(module),
            stale: report.regenerated,
            metadata_path: self.layout.metadata(module),
            gir_cache_path: self.layout.gir_cache(module),
            exports: report.metadata.exports.clone(),
        }
    }

    fn write_back(
        &self,
        reports: &mut [ModuleReport],
        pass: WritePass,
    ) -> Result<Vec<String>, DriverError> {
        let _span = info_span!("write_back", ?pass).entered();
        let force = self.config.force_regen;

        let written = reports
            .par_iter_mut()
            .filter(|report| match pass {
                WritePass::First => report.regenerated || force || report.metadata.dirty,
                WritePass::Again => report.metadata.dirty,
            })
            .map(|report| -> Result<String, CacheIoError> {
                report.metadata.save(&self.layout.metadata(&report.qualified_name))?;
                report.metadata.dirty = false;
                Ok(report.qualified_name.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(written = written.len(), "metadata written");
        Ok(written)
    }

    fn resolve(
        &self,
        reports: &mut [ModuleReport],
        registry: &ModuleRegistry,
    ) -> Result<(), DriverError> {
        let _span = info_span!("resolve").entered();

        let failures: Vec<ModuleFailure> = reports
            .par_iter_mut()
            .filter_map(|report| {
                let gir = report.gir.as_mut()?;
                match cn_gir_lower::resolve_module(gir, &report.metadata.imports, registry) {
                    Ok(referenced) => {
                        report.metadata.merge_referenced(referenced);
                        None
                    }
                    Err(err) => Some(ModuleFailure::new(report.qualified_name.clone(), err)),
                }
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DriverError::BatchFailed { failures })
        }
    }
}

fn collect_batch(
    outcomes: Vec<Result<ModuleReport, ModuleFailure>>,
) -> Result<Vec<ModuleReport>, DriverError> {
    let mut reports = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(failure) => failures.push(failure),
        }
    }

    if failures.is_empty() {
        Ok(reports)
    } else {
        Err(DriverError::BatchFailed { failures })
    }
}
