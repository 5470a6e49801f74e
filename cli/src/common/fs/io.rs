//! # lumigrate Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Thin wrappers around `std::fs` used by the pipeline stages. Each wrapper
//! attaches the offending path to its error with `anyhow::Context`, so a
//! failed stage logs a message that says which file was involved.
//!
//! - **`ensure_dir_exists`**: `mkdir -p`, rejecting paths that exist as files.
//! - **`read_file_to_string`** / **`write_string_to_file`**: whole-file text I/O;
//!   writing creates the parent directory first.
//! - **`append_string_to_file`**: appends, creating the file when missing.
//! - **`remove_file_if_exists`**: deletes a file and reports whether it existed.
//! - **`rename_file`**: moves a file, replacing the target.
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::ensure_dir_exists(&dest.join("routes"))?;
//! let routes = io::read_file_to_string(&dest.join("routes/web.php"))?;
//! io::append_string_to_file(&dest.join("removed_packages.txt"), "vendor/pkg\n")?;
//! ```
//!
use crate::core::error::{MigrateError, Result};
use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Ensures that a directory exists at the specified path.
///
/// Creates missing parents like `mkdir -p`. Fails with
/// `MigrateError::FileSystem` if the path exists but is not a directory.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        debug!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(MigrateError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes string content to a file, overwriting it if it exists.
///
/// The parent directory is created first when missing.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file {:?}", path))?;
    debug!("Wrote content to file: {:?}", path);
    Ok(())
}

/// Appends string content to a file, creating it when missing.
pub fn append_string_to_file(path: &Path, content: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open file for appending {:?}", path))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to append to file {:?}", path))?;
    Ok(())
}

/// Removes a file if present. Returns `true` when something was deleted.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("Failed to remove file {:?}", path))?;
    debug!("Removed file: {:?}", path);
    Ok(true)
}

/// Renames `from` to `to`, replacing `to` if it exists.
pub fn rename_file(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).with_context(|| format!("Failed to rename {:?} to {:?}", from, to))?;
    debug!("Renamed {:?} to {:?}", from, to);
    Ok(())
}
