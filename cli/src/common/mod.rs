//! # lumigrate Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Cross-cutting helpers used by the migration stages, kept apart from the
//! command-specific logic in `commands::` and the infrastructure in `core::`:
//!
//! - **`fs`**: file I/O and exclusion-aware recursive copying.
//! - **`process`**: running external programs and capturing their output.
//!

/// Utilities for filesystem operations (copying, I/O).
pub mod fs;
/// Utilities for executing external processes.
pub mod process;
