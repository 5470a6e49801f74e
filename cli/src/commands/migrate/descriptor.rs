//! Per-run identity of a migration and the options it runs with.

use super::composer::Composer;
use std::path::{Path, PathBuf};

/// Identifies one migration run.
///
/// Built once by the orchestrator after the target version has been
/// resolved, then lent to every stage. Never shared between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    /// Laravel version constraint, e.g. `9.*`. `None` when it could not be
    /// derived from the origin manifest.
    pub version: Option<String>,
    pub origin: PathBuf,
    pub destination: PathBuf,
}

impl ProjectDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        origin: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// `<origin>_new`, next to the origin directory.
    pub fn default_destination(origin: &Path) -> PathBuf {
        match origin.file_name() {
            Some(name) => {
                let mut renamed = name.to_os_string();
                renamed.push("_new");
                origin.with_file_name(renamed)
            }
            None => origin.join("_new"),
        }
    }

    pub fn origin_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.origin.join(relative)
    }

    pub fn destination_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.destination.join(relative)
    }
}

/// Caller-selected switches for one run.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Run the `.env` merge stage.
    pub merge_env: bool,
    pub composer: Composer,
}
