//! # lumigrate Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Runs external programs (Composer, in practice) and hands their exit status
//! and captured output back to the caller without interpreting them. Whether
//! a non-zero exit is fatal, recoverable, or expected is the caller's
//! decision.
//!
//! The call blocks until the child exits. There is no timeout; a hung child
//! stalls the calling pipeline run.
//!
//! ```rust
//! use crate::common::process;
//!
//! let output = process::run_command("composer", &["install"], Some(&dest))?;
//! if !output.success() {
//!     for line in output.combined().lines() { /* scan */ }
//! }
//! ```
//!
use crate::core::error::{MigrateError, Result};
use anyhow::Context;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// Captured result of a finished child process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Human-readable form of the invocation, for logs and errors.
    pub command_line: String,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (true, _) => self.stderr.clone(),
            (_, true) => self.stdout.clone(),
            _ => format!("{}\n{}", self.stdout, self.stderr),
        }
    }

    /// Converts a non-zero exit into `MigrateError::ExternalCommand`.
    pub fn into_result(self) -> Result<CommandOutput> {
        if self.success() {
            return Ok(self);
        }
        Err(MigrateError::ExternalCommand {
            cmd: self.command_line.clone(),
            status: self.status.to_string(),
            output: self.combined(),
        }
        .into())
    }
}

/// Runs `program` with `args`, optionally inside `cwd`, capturing all output.
///
/// # Errors
///
/// Fails only if the process cannot be spawned or waited on. A non-zero exit
/// status is reported through the returned `CommandOutput`.
pub fn run_command(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
    let command_line = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    info!("Executing command: {}", command_line);

    let mut command = Command::new(program);
    command.args(args);
    command.stdin(Stdio::null());
    if let Some(dir) = cwd {
        debug!("Setting CWD for command to {}", dir.display());
        command.current_dir(dir);
    }

    let output = command
        .output()
        .with_context(|| format!("Failed to execute '{}'", command_line))?;

    let result = CommandOutput {
        command_line,
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(
        "Command '{}' finished with {}",
        result.command_line, result.status
    );
    Ok(result)
}
