//! mechgen orchestrator.
//!
//! ```text
//! config tree → sync (merge) → validate → emit → write-if-changed
//! ```
//!
//! The orchestrator owns the three core operations exposed to callers:
//!
//! - [`Generator::generate`] — merge every mechanism instance against its
//!   template, validate the tree, render every output file and persist the
//!   changed ones; decorator files are written on first generation only.
//! - [`Generator::clean`] — guarded deletion of generated (and optionally
//!   decorator) subtrees.
//! - [`Generator::write_tunable_parameter_files`] — per-robot parameter
//!   files carrying only tunable fields.
//!
//! Everything runs single-threaded and synchronously; robots and mechanism
//! instances are processed in declared order so generated ordinals and
//! dispatch chains stay stable across runs.

mod checker;
mod clean;
mod config;
mod generate;
mod tunable;

pub use config::GeneratorConfig;

use std::path::{Path, PathBuf};

use mechgen_types::model::RobotVariantSet;
use mechgen_types::{GenResult, ProgressCallback, ProgressLog};

/// The code generator.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generator with the built-in templates and default unit catalog.
    pub fn with_defaults() -> GenResult<Self> {
        Ok(Self::new(GeneratorConfig::default_config()?))
    }

    /// Run merge + emission for every mechanism instance and persist the
    /// output under `output_root`. Returns the progress log entries.
    pub fn generate(
        &self,
        tool_version: &str,
        set: &RobotVariantSet,
        output_root: &Path,
    ) -> GenResult<Vec<String>> {
        let mut log = ProgressLog::new();
        generate::run(&self.config, tool_version, set, output_root, &mut log)?;
        Ok(log.into_entries())
    }

    /// [`generate`](Self::generate) with a live progress callback.
    pub fn generate_with_progress(
        &self,
        tool_version: &str,
        set: &RobotVariantSet,
        output_root: &Path,
        callback: ProgressCallback<'_>,
    ) -> GenResult<Vec<String>> {
        let mut log = ProgressLog::with_callback(callback);
        generate::run(&self.config, tool_version, set, output_root, &mut log)?;
        Ok(log.into_entries())
    }

    /// Delete generated subtrees under `output_root`; decorator subtrees
    /// too when `include_decorator_folders` is set. Returns the progress
    /// log entries.
    pub fn clean(
        &self,
        output_root: &Path,
        include_decorator_folders: bool,
    ) -> GenResult<Vec<String>> {
        let mut log = ProgressLog::new();
        clean::run(output_root, include_decorator_folders, &mut log)?;
        Ok(log.into_entries())
    }

    /// Write one tunable-parameter file per mechanism instance per robot
    /// under `deploy_root`. Returns every emitted file path.
    pub fn write_tunable_parameter_files(
        &self,
        set: &RobotVariantSet,
        deploy_root: &Path,
    ) -> GenResult<Vec<PathBuf>> {
        let mut log = ProgressLog::new();
        tunable::run(set, deploy_root, &mut log)
    }
}
