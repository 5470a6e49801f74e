//! # Composer Invocation (`commands::migrate::composer`)
//!
//! File: cli/src/commands/migrate/composer.rs
//!
//! ## Overview
//!
//! Thin wrapper around the `composer` executable. It knows which program to
//! run and whether every invocation must carry `--no-interaction`; it builds
//! the argument lists for the two commands the pipeline needs and leaves the
//! interpretation of the result to the calling stage.
//!
//! Also hosts the scaffolding stage (`create_project`), which is nothing more
//! than a single `composer create-project` call.
//!
use super::descriptor::ProjectDescriptor;
use crate::common::process::{self, CommandOutput};
use crate::core::error::{MigrateError, Result};
use std::path::Path;
use tracing::info;

/// Package the destination is scaffolded from.
pub const LARAVEL_SKELETON: &str = "laravel/laravel";
pub const DEFAULT_PROGRAM: &str = "composer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    program: String,
    no_interaction: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, false)
    }
}

impl Composer {
    pub fn new(program: impl Into<String>, no_interaction: bool) -> Self {
        Self {
            program: program.into(),
            no_interaction,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn no_interaction(&self) -> bool {
        self.no_interaction
    }

    /// Arguments for `create-project`. The version constraint is omitted when
    /// unknown, letting Composer pick the latest skeleton.
    pub fn create_project_args<'a>(&self, destination: &'a str, version: Option<&'a str>) -> Vec<&'a str> {
        let mut args = vec!["create-project", "--prefer-dist", LARAVEL_SKELETON, destination];
        args.extend(version);
        self.finish(args)
    }

    /// Arguments for `install`, optionally skipping package scripts.
    pub fn install_args(&self, no_scripts: bool) -> Vec<&'static str> {
        let mut args = vec!["install"];
        if no_scripts {
            args.push("--no-scripts");
        }
        self.finish(args)
    }

    fn finish<'a>(&self, mut args: Vec<&'a str>) -> Vec<&'a str> {
        if self.no_interaction {
            args.push("--no-interaction");
        }
        args
    }

    /// Runs `composer install` inside `project_dir`.
    ///
    /// # Errors
    ///
    /// Only when Composer cannot be started. A failed install is reported
    /// through the returned output.
    pub fn install(&self, project_dir: &Path, no_scripts: bool) -> Result<CommandOutput> {
        process::run_command(&self.program, &self.install_args(no_scripts), Some(project_dir))
    }

    /// Runs `composer create-project` for `destination` from the current directory.
    pub fn create_project(&self, destination: &Path, version: Option<&str>) -> Result<CommandOutput> {
        let destination = destination.to_str().ok_or_else(|| {
            MigrateError::FileSystem(format!(
                "Destination path is not valid UTF-8: {:?}",
                destination
            ))
        })?;
        process::run_command(&self.program, &self.create_project_args(destination, version), None)
    }
}

/// Scaffolds a fresh Laravel project at the descriptor's destination.
///
/// # Errors
///
/// Returns `MigrateError::ExternalCommand` (with Composer's output) on a
/// non-zero exit, or the spawn error if Composer could not be started.
pub fn create_project(descriptor: &ProjectDescriptor, composer: &Composer) -> Result<()> {
    match descriptor.version.as_deref() {
        Some(version) => info!(
            "Creating Laravel {} project at {:?}",
            version, descriptor.destination
        ),
        None => info!(
            "Creating Laravel project at {:?} without a version constraint",
            descriptor.destination
        ),
    }
    composer
        .create_project(&descriptor.destination, descriptor.version.as_deref())?
        .into_result()?;
    Ok(())
}
