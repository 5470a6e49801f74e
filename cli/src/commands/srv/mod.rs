//! # lumigrate Migration Trigger Server
//!
//! File: cli/src/commands/srv/mod.rs
//!
//! ## Overview
//!
//! Implements `lumigrate srv`, a small HTTP server that starts migrations on
//! request. Projects are expected under the configured repository root as
//! `<projectName>/<projectPath>`; each accepted request launches one
//! pipeline run in the background and is answered right away.
//!
//! ## Architecture
//!
//! - `config.rs`: command-line arguments and effective server settings
//! - `server_logic.rs`: the Axum router, request handling and background launch
//!
//! ## Examples
//!
//! ```bash
//! # Serve on 127.0.0.1:5000 with projects under ./storage/repositories
//! lumigrate srv
//!
//! # All interfaces, custom root
//! lumigrate srv --host 0.0.0.0 --port 8080 --repository-root /data/lumen
//!
//! curl -X POST http://127.0.0.1:5000/api/migrate \
//!   -H 'content-type: application/json' \
//!   -d '{"projectPath": "api", "projectName": "shop", "withEnv": "true"}'
//! ```
//!
use crate::core::error::Result;
use tracing::info;

pub use config::SrvArgs;

/// Argument parsing and configuration layering for the trigger server.
pub mod config;

/// The Axum-based trigger server.
pub mod server_logic;

/// # Handle Server Command (`handle_srv`)
///
/// Resolves the effective configuration and runs the server until shutdown.
///
/// ## Errors
///
/// Propagates configuration errors and failures to bind or serve.
pub async fn handle_srv(args: SrvArgs) -> Result<()> {
    info!("Handling srv command with args: {:?}", args);

    let config = config::load_and_merge_config(args)?;
    info!("Effective server config: {:?}", config);

    server_logic::run_server(config).await
}
