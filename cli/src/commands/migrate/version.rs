//! Target-version resolution: maps the Lumen constraint in the origin manifest
//! to the Laravel skeleton constraint passed to `create-project`.

use super::manifest::{self, LUMEN_PACKAGE, MANIFEST_FILE};
use crate::core::error::{MigrateError, Result};
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

static CARET_CONSTRAINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\^(\d+)\.(\d+)").expect("caret constraint pattern is valid"));

/// `^9.0` becomes `9.*`. Anything not starting with a caret major.minor is
/// returned unchanged.
pub fn convert_version(constraint: &str) -> String {
    match CARET_CONSTRAINT.captures(constraint) {
        Some(caps) => format!("{}.*", &caps[1]),
        None => constraint.to_string(),
    }
}

/// Reads the Lumen constraint from `<origin>/composer.json` and converts it.
///
/// # Errors
///
/// Fails when the manifest cannot be read or parsed, or has no string entry
/// for `laravel/lumen-framework` under `require`.
pub fn resolve_version(origin: &Path) -> Result<String> {
    let manifest_path = origin.join(MANIFEST_FILE);
    let manifest = manifest::read_manifest(&manifest_path)?;
    let constraint = manifest
        .get("require")
        .and_then(|require| require.get(LUMEN_PACKAGE))
        .and_then(Value::as_str)
        .ok_or_else(|| MigrateError::Manifest {
            path: manifest_path.display().to_string(),
            reason: format!("no '{}' constraint under 'require'", LUMEN_PACKAGE),
        })?;

    let version = convert_version(constraint);
    info!("Lumen constraint '{}' resolved to Laravel '{}'", constraint, version);
    Ok(version)
}
