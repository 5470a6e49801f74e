//! # lumigrate Filesystem Copy Operations
//!
//! File: cli/src/common/fs/copy.rs
//!
//! ## Overview
//!
//! Recursive, exclusion-aware directory copying used to carry the Lumen
//! subtrees (`app`, `config`, `public`, ...) into the scaffolded Laravel
//! project.
//!
//! ## Architecture
//!
//! `copy_tree` walks the source with `walkdir` and mirrors it below the
//! target:
//! - directories are created when missing;
//! - a file whose name equals `exclude` is skipped entirely, and a file of
//!   that name already present in the target is left untouched;
//! - every other file is copied, overwriting an existing target file.
//!
//! Symbolic links are followed, so a linked file is copied as content and a
//! linked directory is walked like a regular one.
//!
//! ```rust
//! use crate::common::fs::copy;
//!
//! // Keep the scaffold's own public/index.php.
//! copy::copy_tree(&origin.join("public"), &dest.join("public"), Some("index.php"))?;
//! ```
//!
use crate::core::error::{MigrateError, Result};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Copies `source` into `target` recursively, skipping files named `exclude`.
///
/// # Errors
///
/// Returns an `Err` if `source` is not a directory, if an entry cannot be
/// read during the walk, or if a directory or file cannot be written.
pub fn copy_tree(source: &Path, target: &Path, exclude: Option<&str>) -> Result<()> {
    if !source.is_dir() {
        anyhow::bail!(MigrateError::FileSystem(format!(
            "Source directory not found: {:?}",
            source
        )));
    }
    info!("Copying {:?} to {:?}", source, target);
    fs::create_dir_all(target)
        .with_context(|| format!("Failed to create directory {:?}", target))?;

    let mut copied = 0usize;
    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry =
            entry.with_context(|| format!("Failed to read entry while walking {:?}", source))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("Entry {:?} escaped {:?}", entry.path(), source))?;
        let target_path = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path)
                .with_context(|| format!("Failed to create directory {:?}", target_path))?;
            continue;
        }

        if exclude.is_some_and(|name| entry.file_name() == name) {
            debug!("Skipping excluded file {:?}", entry.path());
            continue;
        }

        fs::copy(entry.path(), &target_path).with_context(|| {
            format!("Failed to copy {:?} to {:?}", entry.path(), target_path)
        })?;
        debug!("Copied file: {:?}", target_path);
        copied += 1;
    }

    info!("Copied {} file(s) from {:?}", copied, source);
    Ok(())
}
