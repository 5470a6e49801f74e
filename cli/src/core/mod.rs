//! # lumigrate Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by every command:
//! - `config`: layered TOML configuration (defaults, user file, project file)
//! - `error`: the `MigrateError` enum and the `Result` alias
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{MigrateError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
