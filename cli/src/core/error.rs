//! # lumigrate Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout lumigrate. Functions
//! return `anyhow::Result` so that context can be attached at each call site,
//! while failures that callers may want to distinguish are expressed as
//! variants of `MigrateError`.
//!
//! ## Architecture
//!
//! - `MigrateError`: a `thiserror` enum covering configuration, filesystem,
//!   manifest, and external command failures.
//! - `Result<T>`: an alias for `anyhow::Result<T>`.
//!
//! Pipeline stages return these errors; the orchestrator records them and
//! never propagates them to its caller.
//!
//! ## Examples
//!
//! ```rust
//! let manifest = read_manifest(&path)?;
//! let require = manifest.get("require-dev").ok_or_else(|| {
//!     MigrateError::MissingManifestSection { section: "require-dev".into() }
//! })?;
//!
//! // Checking for a specific failure kind
//! if let Some(MigrateError::ExternalCommand { output, .. }) = err.downcast_ref() {
//!     scan(output);
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for lumigrate.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Invalid manifest '{path}': {reason}")]
    Manifest { path: String, reason: String },

    #[error("Manifest has no '{section}' section.")]
    MissingManifestSection { section: String },

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },

    #[error("Install still failing after removing incompatible packages: {}", packages.join(", "))]
    IncompatiblePackages { packages: Vec<String> },

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
