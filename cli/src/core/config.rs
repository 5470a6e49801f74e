//! # lumigrate Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges, and validates lumigrate's configuration. It
//! supports a multi-level approach that combines defaults, user settings, and
//! project-specific overrides.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.lumigrate.toml` in current directory or ancestors
//! 2. User-specific `<config dir>/lumigrate/config.toml`
//! 3. Default values defined in the code
//!
//! Paths are tilde-expanded and the result is validated before use. Command
//! line flags are applied on top by the individual commands.
//!
//! ## Examples
//!
//! ```toml
//! [paths]
//! repository_root = "~/lumen-repos"
//!
//! [composer]
//! program = "/usr/local/bin/composer"
//! no_interaction = true
//!
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//! ```
//!
//! ```rust
//! let cfg = config::load_config()?;
//! let composer = &cfg.composer.program;
//! let root = cfg.paths.repository_root_path()?;
//! ```
//!
use crate::core::error::{MigrateError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default)]
    pub server: ServerSection,
}

/// Where migration requests resolve project paths from.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Root holding `<project name>/<project path>` trees (can use ~).
    /// Relative values are resolved against the working directory.
    #[serde(default = "default_repository_root")]
    pub repository_root: String,
}

/// How the Composer package manager is invoked.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComposerConfig {
    /// Program name or path of the Composer executable.
    #[serde(default = "default_composer_program")]
    pub program: String,
    /// Pass `--no-interaction` to every Composer invocation.
    #[serde(default)]
    pub no_interaction: bool,
}

/// Bind address of the `srv` trigger server.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_server_host")]
    pub host: IpAddr,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            repository_root: default_repository_root(),
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            program: default_composer_program(),
            no_interaction: false,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

fn default_repository_root() -> String {
    "storage/repositories".to_string()
}
fn default_composer_program() -> String {
    "composer".to_string()
}
fn default_server_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
fn default_server_port() -> u16 {
    5000
}

impl PathsConfig {
    /// Returns the repository root as an absolute path.
    pub fn repository_root_path(&self) -> Result<PathBuf> {
        let root = PathBuf::from(&self.repository_root);
        if root.is_absolute() {
            return Ok(root);
        }
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Ok(cwd.join(root))
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".lumigrate.toml";

pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "lumigrate", "lumigrate") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No {} found in current directory or ancestors.", PROJECT_CONFIG_FILENAME);
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win wherever they differ from the built-in defaults.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let defaults = Config::default();
    let mut merged = user;
    if project_cfg.paths.repository_root != defaults.paths.repository_root {
        merged.paths.repository_root = project_cfg.paths.repository_root;
    }
    if project_cfg.composer.program != defaults.composer.program {
        merged.composer.program = project_cfg.composer.program;
    }
    merged.composer.no_interaction |= project_cfg.composer.no_interaction;
    if project_cfg.server.host != defaults.server.host {
        merged.server.host = project_cfg.server.host;
    }
    if project_cfg.server.port != defaults.server.port {
        merged.server.port = project_cfg.server.port;
    }
    merged
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.paths.repository_root = shellexpand::tilde(&config.paths.repository_root).into_owned();
    debug!("Expanded repository root: {}", config.paths.repository_root);
    config.composer.program = shellexpand::tilde(&config.composer.program).into_owned();
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    if config.composer.program.trim().is_empty() {
        return Err(anyhow!(MigrateError::Config(
            "composer.program cannot be empty.".to_string()
        )));
    }
    if config.server.port == 0 {
        return Err(anyhow!(MigrateError::Config(
            "server.port must be between 1 and 65535.".to_string()
        )));
    }
    if config.paths.repository_root.trim().is_empty() {
        return Err(anyhow!(MigrateError::Config(
            "paths.repository_root cannot be empty.".to_string()
        )));
    }
    let root = PathBuf::from(&config.paths.repository_root);
    if root.exists() && !root.is_dir() {
        return Err(anyhow!(MigrateError::Config(format!(
            "Configured repository root '{}' exists but is not a directory.",
            root.display()
        ))));
    }
    Ok(())
}
