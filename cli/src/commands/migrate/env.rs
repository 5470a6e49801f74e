//! `.env` merging.
//!
//! Only plain `KEY=VALUE` lines are understood; comments, blank lines and
//! anything else without an `=` are dropped when the destination is rewritten.

use super::descriptor::ProjectDescriptor;
use crate::common::fs::io;
use crate::core::error::Result;
use indexmap::IndexMap;
use tracing::info;

pub const ENV_FILE: &str = ".env";

/// Ordered environment variables. A repeated key keeps its first position
/// and takes its last value.
pub type EnvSet = IndexMap<String, String>;

pub fn parse_env(content: &str) -> EnvSet {
    let mut vars = EnvSet::new();
    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), value.trim().to_string());
    }
    vars
}

/// Origin keys first in origin order, then destination-only keys. The
/// destination value wins when both define a key.
pub fn merge_env(origin: &EnvSet, destination: &EnvSet) -> EnvSet {
    let mut merged = origin.clone();
    for (key, value) in destination {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// `KEY=VALUE` lines joined by `\n`, no trailing newline.
pub fn serialize_env(vars: &EnvSet) -> String {
    vars.iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stage: merges the origin `.env` into the destination `.env`.
pub fn merge_env_files(descriptor: &ProjectDescriptor) -> Result<()> {
    let origin_path = descriptor.origin_path(ENV_FILE);
    let destination_path = descriptor.destination_path(ENV_FILE);

    let origin = parse_env(&io::read_file_to_string(&origin_path)?);
    let destination = parse_env(&io::read_file_to_string(&destination_path)?);
    let merged = merge_env(&origin, &destination);
    io::write_string_to_file(&destination_path, &serialize_env(&merged))?;

    info!(
        "Merged {} variable(s) into {:?}",
        merged.len(),
        destination_path
    );
    Ok(())
}
