//! # Dependency Manifest Handling (`commands::migrate::manifest`)
//!
//! File: cli/src/commands/migrate/manifest.rs
//!
//! ## Overview
//!
//! Reads, merges and writes `composer.json` documents. Manifests are kept as
//! `serde_json::Value` trees so that keys this tool knows nothing about
//! survive untouched; with `serde_json`'s `preserve_order` feature the key
//! order of the file is kept as well.
//!
//! ## Merge Rules
//!
//! `merge_manifests` folds the Lumen manifest into the Laravel scaffold's:
//! - `laravel/lumen-framework` is never carried over;
//! - origin `require` entries are added only where the destination has no
//!   entry for the package, so the scaffold's constraints win;
//! - `autoload` is merged one level deep with origin keys overriding.
//!
//! `remove_packages` is used by the installer to drop packages Composer
//! reported as incompatible. It insists on both `require` and `require-dev`
//! being present before touching anything.
//!
use super::descriptor::ProjectDescriptor;
use crate::common::fs::io;
use crate::core::error::{MigrateError, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

pub const MANIFEST_FILE: &str = "composer.json";
pub const LUMEN_PACKAGE: &str = "laravel/lumen-framework";

/// Reads and parses a manifest.
///
/// # Errors
///
/// `MigrateError::Manifest` when the file is unreadable or not valid JSON.
pub fn read_manifest(path: &Path) -> Result<Value> {
    let content = io::read_file_to_string(path).map_err(|e| MigrateError::Manifest {
        path: path.display().to_string(),
        reason: format!("{:#}", e),
    })?;
    let manifest = serde_json::from_str(&content).map_err(|e| MigrateError::Manifest {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(manifest)
}

/// Writes a manifest with two-space indentation and a trailing newline.
pub fn write_manifest(path: &Path, manifest: &Value) -> Result<()> {
    let mut content = serde_json::to_string_pretty(manifest).map_err(|e| MigrateError::Manifest {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    content.push('\n');
    io::write_string_to_file(path, &content)
}

fn as_object_mut<'a>(value: &'a mut Value, label: &str) -> Result<&'a mut Map<String, Value>> {
    value.as_object_mut().ok_or_else(|| {
        MigrateError::Manifest {
            path: label.to_string(),
            reason: "top level is not a JSON object".to_string(),
        }
        .into()
    })
}

/// Looks up an optional object-valued section. Present but not an object is an error.
fn object_section<'a>(
    manifest: &'a Map<String, Value>,
    section: &str,
    label: &str,
) -> Result<Option<&'a Map<String, Value>>> {
    match manifest.get(section) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(MigrateError::Manifest {
            path: label.to_string(),
            reason: format!("'{}' is not a JSON object", section),
        }
        .into()),
    }
}

/// Merges the Lumen `origin` manifest into the Laravel `destination` manifest.
///
/// # Errors
///
/// `MigrateError::Manifest` when either document is not an object or one of
/// the merged sections has the wrong JSON type.
pub fn merge_manifests(origin: &Value, mut destination: Value) -> Result<Value> {
    let origin = origin.as_object().ok_or_else(|| MigrateError::Manifest {
        path: "origin".to_string(),
        reason: "top level is not a JSON object".to_string(),
    })?;
    let merged = as_object_mut(&mut destination, "destination")?;

    let origin_require = object_section(origin, "require", "origin")?;
    object_section(merged, "require", "destination")?;
    let require = merged
        .entry("require")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| MigrateError::Manifest {
            path: "destination".to_string(),
            reason: "'require' is not a JSON object".to_string(),
        })?;
    if let Some(origin_require) = origin_require {
        for (package, constraint) in origin_require {
            if package == LUMEN_PACKAGE {
                continue;
            }
            if require.contains_key(package) {
                debug!("Keeping scaffold constraint for {}", package);
                continue;
            }
            require.insert(package.clone(), constraint.clone());
        }
    }

    if let Some(origin_autoload) = object_section(origin, "autoload", "origin")? {
        let mut autoload = object_section(merged, "autoload", "destination")?
            .cloned()
            .unwrap_or_default();
        for (key, value) in origin_autoload {
            autoload.insert(key.clone(), value.clone());
        }
        merged.insert("autoload".to_string(), Value::Object(autoload));
    }

    Ok(destination)
}

/// Removes `packages` from both `require` and `require-dev`.
///
/// # Errors
///
/// `MigrateError::MissingManifestSection` if either section is absent or not
/// an object; the manifest is left unchanged in that case.
pub fn remove_packages(manifest: &mut Value, packages: &[String]) -> Result<()> {
    const SECTIONS: [&str; 2] = ["require", "require-dev"];

    for section in SECTIONS {
        if !manifest.get(section).is_some_and(Value::is_object) {
            return Err(MigrateError::MissingManifestSection {
                section: section.to_string(),
            }
            .into());
        }
    }
    for section in SECTIONS {
        if let Some(Value::Object(map)) = manifest.get_mut(section) {
            map.retain(|package, _| !packages.iter().any(|p| p == package));
        }
    }
    Ok(())
}

/// Stage: merges the origin manifest into the destination manifest on disk.
pub fn adjust_manifest(descriptor: &ProjectDescriptor) -> Result<()> {
    let origin_path = descriptor.origin_path(MANIFEST_FILE);
    let destination_path = descriptor.destination_path(MANIFEST_FILE);

    let origin = read_manifest(&origin_path)?;
    let destination = read_manifest(&destination_path)?;
    let merged = merge_manifests(&origin, destination)?;
    write_manifest(&destination_path, &merged)?;

    info!("Merged {:?} into {:?}", origin_path, destination_path);
    Ok(())
}
