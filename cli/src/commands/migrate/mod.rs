//! # lumigrate Migration Command
//!
//! File: cli/src/commands/migrate/mod.rs
//!
//! ## Overview
//!
//! Implements `lumigrate migrate`, which converts one Lumen project into a
//! Laravel project in the foreground and prints what happened to each stage.
//! The same pipeline is launched in the background by `lumigrate srv`.
//!
//! ## Architecture
//!
//! - `pipeline.rs`: the orchestrator, `Stage` and `MigrationReport`
//! - `descriptor.rs`: `ProjectDescriptor` and `MigrationOptions`
//! - `version.rs`: stage 1, Lumen constraint to Laravel constraint
//! - `composer.rs`: the `Composer` wrapper and stage 2 (scaffolding)
//! - `files.rs`: stage 3, copying the Lumen subtrees
//! - `manifest.rs`: stage 4, `composer.json` merging
//! - `namespaces.rs`: stage 5, base-class import rewriting
//! - `routes.rs`: stages 6 and 7, route conversion and relocation
//! - `installer.rs`: stage 8, `composer install` with conflict resolution
//! - `env.rs`: stage 9, `.env` merging
//!
//! ## Examples
//!
//! ```bash
//! # Writes the Laravel project to ./api_new
//! lumigrate migrate ./api
//!
//! # Explicit destination, merge .env, never prompt
//! lumigrate migrate ./api --destination /tmp/api-laravel --with-env --no-interaction
//!
//! # Use a specific Composer binary
//! LUMIGRATE_COMPOSER=/opt/php74/bin/composer lumigrate migrate ./api
//! ```
//!
//! Stage failures are reported in the summary but do not change the exit
//! status; only invalid configuration or arguments do.
//!
use crate::core::config;
use crate::core::error::{MigrateError, Result};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod composer;
pub mod descriptor;
pub mod env;
pub mod files;
pub mod installer;
pub mod manifest;
pub mod namespaces;
pub mod pipeline;
pub mod routes;
pub mod version;

use composer::Composer;
use descriptor::{MigrationOptions, ProjectDescriptor};
use pipeline::MigrationReport;

/// # Migrate Command Arguments (`MigrateArgs`)
///
/// Arguments for `lumigrate migrate`. Composer settings fall back to the
/// loaded configuration when not given here.
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Path to the Lumen project to convert.
    pub origin: PathBuf,

    /// Where to create the Laravel project. Defaults to `<ORIGIN>_new`.
    #[arg(long, short)]
    pub destination: Option<PathBuf>,

    /// Project name used in logs. Defaults to the origin directory name.
    #[arg(long, short)]
    pub name: Option<String>,

    /// Merge the origin `.env` into the new project's `.env`.
    #[arg(long)]
    pub with_env: bool,

    /// Pass `--no-interaction` to every Composer invocation.
    #[arg(long)]
    pub no_interaction: bool,

    /// Composer executable to run.
    #[arg(long, env = "LUMIGRATE_COMPOSER")]
    pub composer: Option<String>,
}

/// Turns a possibly relative path into an absolute one without touching the
/// filesystem beyond reading the working directory.
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}

fn project_name(origin: &Path) -> Result<String> {
    origin
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            MigrateError::ArgumentParsing(format!(
                "Cannot derive a project name from {:?}; pass --name",
                origin
            ))
            .into()
        })
}

/// # Handle Migrate Command (`handle_migrate`)
///
/// Resolves paths and Composer settings, runs the pipeline on a blocking
/// worker and prints a per-stage summary.
///
/// ## Errors
///
/// Returns an `Err` for invalid configuration, an underivable project name,
/// or if the pipeline task panics. Stage failures are not errors here.
pub async fn handle_migrate(args: MigrateArgs) -> Result<()> {
    info!("Handling migrate command with args: {:?}", args);
    let cfg = config::load_config()?;

    let origin = absolutize(&args.origin)?;
    let destination = match &args.destination {
        Some(d) => absolutize(d)?,
        None => ProjectDescriptor::default_destination(&origin),
    };
    let name = match args.name {
        Some(name) => name,
        None => project_name(&origin)?,
    };
    let options = MigrationOptions {
        merge_env: args.with_env,
        composer: Composer::new(
            args.composer.unwrap_or(cfg.composer.program),
            args.no_interaction || cfg.composer.no_interaction,
        ),
    };
    debug!("Migration options: {:?}", options);

    let report = tokio::task::spawn_blocking(move || {
        pipeline::run(&origin, &destination, &name, &options)
    })
    .await
    .context("Migration task panicked")?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &MigrationReport) {
    let descriptor = &report.descriptor;
    println!(
        "Migration of '{}': {} -> {}",
        descriptor.name,
        descriptor.origin.display(),
        descriptor.destination.display()
    );
    if let Some(version) = &descriptor.version {
        println!("Laravel version: {}", version);
    }
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!("  ✅ {}", outcome.stage),
            Some(e) => println!("  ❌ {}: {}", outcome.stage, e),
        }
    }
    if report.is_success() {
        println!("Migration completed.");
    } else {
        println!(
            "Migration finished with {} failed stage(s).",
            report.failures().count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize_keeps_absolute_paths() -> Result<()> {
        let abs = std::env::temp_dir();
        assert_eq!(absolutize(&abs)?, abs);
        let rel = absolutize(Path::new("api"))?;
        assert!(rel.is_absolute());
        assert!(rel.ends_with("api"));
        Ok(())
    }

    #[test]
    fn test_project_name_from_origin() -> Result<()> {
        assert_eq!(project_name(Path::new("/repos/shop/api"))?, "api");
        assert!(project_name(Path::new("/")).is_err());
        Ok(())
    }

    #[test]
    fn test_migrate_args_parse() {
        let args = MigrateArgs::parse_from([
            "migrate",
            "./api",
            "--destination",
            "/tmp/out",
            "--with-env",
            "--composer",
            "/opt/composer",
        ]);
        assert_eq!(args.origin, PathBuf::from("./api"));
        assert_eq!(args.destination, Some(PathBuf::from("/tmp/out")));
        assert!(args.with_env);
        assert!(!args.no_interaction);
        assert_eq!(args.composer.as_deref(), Some("/opt/composer"));
    }
}
