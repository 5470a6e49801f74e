//! # lumigrate Trigger Server Configuration
//!
//! File: cli/src/commands/srv/config.rs
//!
//! ## Overview
//!
//! Resolves the effective settings of the `lumigrate srv` trigger server by
//! layering, from highest to lowest priority:
//! 1. Command-line arguments
//! 2. The loaded lumigrate configuration (`[server]`, `[paths]`, `[composer]`)
//! 3. Built-in defaults (carried by the configuration types)
//!
//! ## Examples
//!
//! ```rust
//! let args = SrvArgs::parse();
//! let config = load_and_merge_config(args)?;
//! println!("Listening on {}:{}", config.host, config.port);
//! println!("Projects under {}", config.repository_root.display());
//! ```
//!
use crate::commands::migrate::composer::Composer;
use crate::core::config::{self, Config};
use crate::core::error::Result;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::debug;

/// # Server Command Arguments (`SrvArgs`)
///
/// Arguments for `lumigrate srv`. Every option overrides the corresponding
/// configuration value when given.
#[derive(Parser, Debug, Default)]
pub struct SrvArgs {
    /// Port to listen on (default from config: 5000).
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Address to bind to, e.g. `0.0.0.0` for all interfaces (default: 127.0.0.1).
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Directory holding `<projectName>/<projectPath>` trees.
    #[arg(long, short)]
    pub repository_root: Option<PathBuf>,

    /// Composer executable used by launched migrations.
    #[arg(long, env = "LUMIGRATE_COMPOSER")]
    pub composer: Option<String>,

    /// Force `--no-interaction` on every Composer invocation, whatever the
    /// request asks for.
    #[arg(long)]
    pub no_interaction: bool,
}

/// # Effective Server Configuration (`ServerConfig`)
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Absolute path requests are resolved against.
    pub repository_root: PathBuf,
    /// Composer settings every launched migration starts from.
    pub composer: Composer,
}

/// Layers `args` over an already loaded `Config`.
pub fn resolve_config(args: SrvArgs, cfg: &Config) -> Result<ServerConfig> {
    let repository_root = match args.repository_root {
        Some(root) if root.is_absolute() => root,
        Some(root) => std::env::current_dir()?.join(root),
        None => cfg.paths.repository_root_path()?,
    };
    let composer = Composer::new(
        args.composer.unwrap_or_else(|| cfg.composer.program.clone()),
        args.no_interaction || cfg.composer.no_interaction,
    );

    Ok(ServerConfig {
        host: args.host.unwrap_or(cfg.server.host),
        port: args.port.unwrap_or(cfg.server.port),
        repository_root,
        composer,
    })
}

/// Loads the lumigrate configuration and applies the command-line overrides.
pub fn load_and_merge_config(args: SrvArgs) -> Result<ServerConfig> {
    let cfg = config::load_config()?;
    let server_config = resolve_config(args, &cfg)?;
    debug!("Resolved server config: {:?}", server_config);
    Ok(server_config)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn config_with_root(root: &str) -> Config {
        let mut cfg = Config::default();
        cfg.paths.repository_root = root.to_string();
        cfg
    }

    #[test]
    fn test_resolve_config_uses_configuration_defaults() -> Result<()> {
        let cfg = config_with_root("/srv/repositories");
        let resolved = resolve_config(SrvArgs::default(), &cfg)?;
        assert_eq!(resolved.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(resolved.port, 5000);
        assert_eq!(resolved.repository_root, PathBuf::from("/srv/repositories"));
        assert_eq!(resolved.composer, Composer::new("composer", false));
        Ok(())
    }

    #[test]
    fn test_resolve_config_cli_overrides() -> Result<()> {
        let mut cfg = config_with_root("/srv/repositories");
        cfg.composer.no_interaction = true;
        let args = SrvArgs::parse_from([
            "srv",
            "--port",
            "8080",
            "--host",
            "0.0.0.0",
            "--repository-root",
            "/data/lumen",
            "--composer",
            "/opt/composer",
        ]);

        let resolved = resolve_config(args, &cfg)?;

        assert_eq!(resolved.port, 8080);
        assert_eq!(resolved.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(resolved.repository_root, PathBuf::from("/data/lumen"));
        assert_eq!(resolved.composer, Composer::new("/opt/composer", true));
        Ok(())
    }

    #[test]
    fn test_relative_repository_root_is_absolutized() -> Result<()> {
        let resolved = resolve_config(SrvArgs::default(), &config_with_root("storage/repositories"))?;
        assert!(resolved.repository_root.is_absolute());
        assert!(resolved.repository_root.ends_with("storage/repositories"));
        Ok(())
    }
}
