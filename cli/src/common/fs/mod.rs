//! # lumigrate Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers shared by the migration stages:
//!
//! - **`copy`**: recursive, exclusion-aware tree copying (`copy_tree`).
//! - **`io`**: whole-file reads and writes, appends, directory creation, and
//!   conditional removal.
//!
//! Callers import the submodule they need, e.g.
//! `use crate::common::fs::{copy, io};`.
//!

/// Recursive directory copying (`copy_tree`).
pub mod copy;
/// Basic file I/O (`read_file_to_string`, `write_string_to_file`, ...).
pub mod io;
