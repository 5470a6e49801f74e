//! # lumigrate Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! Aggregates the top-level commands of the lumigrate CLI so that `main.rs`
//! can dispatch to them. Each command defines its own arguments structure
//! and an async handler.
//!
//! ## Command Groups
//!
//! - `migrate`: the migration pipeline and its foreground entry point
//! - `srv`: the HTTP trigger that runs migrations in the background
//!

/// Migration pipeline and the `migrate` command.
pub mod migrate;
/// HTTP trigger server for background migrations.
pub mod srv;
