//! Carries the Lumen source subtrees into the scaffolded destination.

use super::descriptor::ProjectDescriptor;
use crate::common::fs::{copy, io};
use crate::core::error::{MigrateError, Result};
use tracing::{error, info};

/// Subtrees copied from origin to destination, in copy order.
pub const COPIED_SUBTREES: [&str; 8] = [
    "app",
    "resources",
    "config",
    "public",
    "routes",
    "database",
    "storage",
    "tests",
];

/// The front controller under `public/` belongs to the scaffold.
const PUBLIC_ENTRY_POINT: &str = "index.php";

fn exclusion_for(subtree: &str) -> Option<&'static str> {
    (subtree == "public").then_some(PUBLIC_ENTRY_POINT)
}

/// Stage: copies every subtree in `COPIED_SUBTREES`.
///
/// Each subtree is attempted even if an earlier one failed. The destination
/// directory of every subtree is created up front.
///
/// # Errors
///
/// A `FileSystem` error naming the subtrees that could not be copied.
pub fn copy_project_files(descriptor: &ProjectDescriptor) -> Result<()> {
    let mut failed = Vec::new();

    for subtree in COPIED_SUBTREES {
        let source = descriptor.origin_path(subtree);
        let target = descriptor.destination_path(subtree);
        let result = io::ensure_dir_exists(&target)
            .and_then(|_| copy::copy_tree(&source, &target, exclusion_for(subtree)));
        if let Err(e) = result {
            error!("Failed to copy '{}': {:#}", subtree, e);
            failed.push(subtree);
        }
    }

    if !failed.is_empty() {
        return Err(MigrateError::FileSystem(format!(
            "Could not copy subtree(s): {}",
            failed.join(", ")
        ))
        .into());
    }
    info!("Copied Lumen files into {:?}", descriptor.destination);
    Ok(())
}
