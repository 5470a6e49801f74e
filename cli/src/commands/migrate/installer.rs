//! # Dependency Installation (`commands::migrate::installer`)
//!
//! File: cli/src/commands/migrate/installer.rs
//!
//! ## Overview
//!
//! Runs `composer install` in the destination. Lumen projects often pin
//! packages whose newest releases need a newer PHP than the one installed,
//! so a failed install gets one round of conflict resolution:
//!
//! 1. Composer's output is scanned for "your php version ... does not
//!    satisfy that requirement" lines and the offending package names are
//!    collected.
//! 2. The names are appended to `removed_packages.txt` in the destination
//!    and dropped from `require` and `require-dev`.
//! 3. `composer install --no-scripts` is run once more.
//!
//! If nothing matches in step 1, or the retry fails as well, the stage
//! fails. There is never a second removal round.
//!
use super::composer::Composer;
use super::descriptor::ProjectDescriptor;
use super::manifest::{self, MANIFEST_FILE};
use crate::common::fs::io;
use crate::core::error::{MigrateError, Result};
use anyhow::Context;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{error, info, warn};

pub const LOCK_FILE: &str = "composer.lock";
pub const REMOVED_PACKAGES_FILE: &str = "removed_packages.txt";

static PHP_VERSION_CONFLICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"([A-Za-z0-9/._-]+)\[v?\d+(?:\.\d+)+[^\]]*\] require",
        r".*?-> your php version \(\d+(?:\.\d+)+\) does not satisfy that requirement",
    ))
    .expect("php version conflict pattern is valid")
});

/// Package names from every PHP-version conflict line in `output`, in order
/// of appearance. Duplicates are kept.
pub fn find_incompatible_packages(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| PHP_VERSION_CONFLICT.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Logs `packages` to `removed_packages.txt` and drops them from the manifest.
fn remove_incompatible_packages(project_dir: &Path, packages: &[String]) -> Result<()> {
    io::append_string_to_file(
        &project_dir.join(REMOVED_PACKAGES_FILE),
        &format!("Incompatible packages:\n{}\n\n", packages.join("\n")),
    )?;

    let manifest_path = project_dir.join(MANIFEST_FILE);
    let mut manifest = manifest::read_manifest(&manifest_path)?;
    manifest::remove_packages(&mut manifest, packages)
        .with_context(|| format!("Cannot remove incompatible packages from {:?}", manifest_path))?;
    manifest::write_manifest(&manifest_path, &manifest)
}

/// Stage: installs the destination's dependencies, resolving PHP version
/// conflicts once.
///
/// # Errors
///
/// - Composer cannot be started.
/// - The install fails and no conflicting package can be identified (the
///   original `ExternalCommand` error).
/// - The manifest cannot be updated, e.g. it lacks `require-dev`.
/// - The retry fails (`IncompatiblePackages`, wrapping the retry's output).
pub fn install_dependencies(descriptor: &ProjectDescriptor, composer: &Composer) -> Result<()> {
    let project_dir = descriptor.destination.as_path();

    if io::remove_file_if_exists(&project_dir.join(LOCK_FILE))? {
        info!("Removed existing {}", LOCK_FILE);
    }

    let first = composer.install(project_dir, false)?;
    if first.success() {
        info!("Dependencies installed in {:?}", project_dir);
        return Ok(());
    }
    warn!(
        "'{}' failed with {}, looking for incompatible packages",
        first.command_line, first.status
    );

    let packages = find_incompatible_packages(&first.combined());
    if packages.is_empty() {
        first.into_result()?;
        return Ok(());
    }

    info!("Removing incompatible packages: {}", packages.join(", "));
    remove_incompatible_packages(project_dir, &packages)?;

    let retry = composer.install(project_dir, true)?;
    if let Err(e) = retry.into_result() {
        error!("Install still failing after removing {} package(s)", packages.len());
        return Err(e.context(MigrateError::IncompatiblePackages { packages }));
    }
    info!("Dependencies installed after removing incompatible packages");
    Ok(())
}
