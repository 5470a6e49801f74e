//! # Migration Pipeline (`commands::migrate::pipeline`)
//!
//! File: cli/src/commands/migrate/pipeline.rs
//!
//! ## Overview
//!
//! Runs the migration stages strictly in order against one origin and one
//! destination tree:
//!
//! 1. resolve the target Laravel version from the origin manifest;
//! 2. scaffold the destination with `composer create-project`;
//! 3. copy the Lumen subtrees;
//! 4. merge `composer.json`;
//! 5. rewrite Lumen namespace imports;
//! 6. convert `routes/web.php` to Laravel syntax;
//! 7. move it to `routes/api.php` and restore a stock `routes/web.php`;
//! 8. install dependencies, resolving PHP version conflicts once;
//! 9. merge `.env` files, when requested.
//!
//! ## Failure Model
//!
//! Every stage returns a `Result`. The orchestrator records each outcome in
//! a `MigrationReport`, logs it, and moves on; a failed stage never stops
//! the stages after it. Nothing is rolled back.
//!
//! The orchestrator performs no I/O itself. It is synchronous and is meant
//! to run on a blocking thread when called from async code.
//!
use super::descriptor::{MigrationOptions, ProjectDescriptor};
use super::{composer, env, files, installer, manifest, namespaces, routes, version};
use crate::core::error::Result;
use std::fmt;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveVersion,
    Scaffold,
    CopyFiles,
    MergeManifest,
    RewriteNamespaces,
    ConvertRoutes,
    RelocateRoutes,
    InstallDependencies,
    MergeEnv,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::ResolveVersion => "Resolve Laravel version",
            Stage::Scaffold => "Create Laravel project",
            Stage::CopyFiles => "Copy Lumen files",
            Stage::MergeManifest => "Merge composer.json",
            Stage::RewriteNamespaces => "Rewrite Lumen namespaces",
            Stage::ConvertRoutes => "Convert routes",
            Stage::RelocateRoutes => "Move routes to api.php",
            Stage::InstallDependencies => "Install dependencies",
            Stage::MergeEnv => "Merge .env files",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one stage. `error` holds the rendered error chain on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub error: Option<String>,
}

impl StageOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub descriptor: ProjectDescriptor,
    pub outcomes: Vec<StageOutcome>,
}

impl MigrationReport {
    fn new(descriptor: ProjectDescriptor) -> Self {
        Self {
            descriptor,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, stage: Stage, result: Result<()>) {
        let error = match result {
            Ok(()) => {
                info!(project = %self.descriptor.name, "{} succeeded", stage);
                None
            }
            Err(e) => {
                error!(project = %self.descriptor.name, "{} failed: {:#}", stage, e);
                Some(format!("{:#}", e))
            }
        };
        self.outcomes.push(StageOutcome { stage, error });
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StageOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs every stage for one project and returns what happened.
pub fn run(
    origin: &Path,
    destination: &Path,
    name: &str,
    options: &MigrationOptions,
) -> MigrationReport {
    info!(
        "Migrating '{}' from {:?} to {:?}",
        name, origin, destination
    );

    let (version, resolved) = match version::resolve_version(origin) {
        Ok(v) => (Some(v), Ok(())),
        Err(e) => (None, Err(e)),
    };
    let mut report = MigrationReport::new(ProjectDescriptor::new(
        name,
        version,
        origin,
        destination,
    ));
    report.record(Stage::ResolveVersion, resolved);

    let descriptor = report.descriptor.clone();
    let composer = &options.composer;
    report.record(Stage::Scaffold, composer::create_project(&descriptor, composer));
    report.record(Stage::CopyFiles, files::copy_project_files(&descriptor));
    report.record(Stage::MergeManifest, manifest::adjust_manifest(&descriptor));
    report.record(Stage::RewriteNamespaces, namespaces::rewrite_namespaces(&descriptor));
    report.record(Stage::ConvertRoutes, routes::convert_routes(&descriptor));
    report.record(Stage::RelocateRoutes, routes::relocate_routes(&descriptor));
    report.record(
        Stage::InstallDependencies,
        installer::install_dependencies(&descriptor, composer),
    );
    if options.merge_env {
        report.record(Stage::MergeEnv, env::merge_env_files(&descriptor));
    }

    let failed = report.failures().count();
    if failed == 0 {
        info!("Migration of '{}' finished", name);
    } else {
        error!(
            "Migration of '{}' finished with {} failed stage(s)",
            name, failed
        );
    }
    report
}
