//! Rewrites the Lumen base-class imports of the four framework-facing classes
//! every Lumen skeleton ships with.

use super::descriptor::ProjectDescriptor;
use crate::common::fs::io;
use crate::core::error::{MigrateError, Result};
use tracing::{debug, error, info, warn};

/// One import swap applied to one file, relative to the destination root.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceRewrite {
    pub file: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

pub const NAMESPACE_REWRITES: [NamespaceRewrite; 4] = [
    NamespaceRewrite {
        file: "app/Console/Kernel.php",
        from: r"use Laravel\Lumen\Console\Kernel as ConsoleKernel;",
        to: r"use Illuminate\Foundation\Console\Kernel as ConsoleKernel;",
    },
    NamespaceRewrite {
        file: "app/Exceptions/Handler.php",
        from: r"use Laravel\Lumen\Exceptions\Handler as ExceptionHandler;",
        to: r"use Illuminate\Foundation\Exceptions\Handler as ExceptionHandler;",
    },
    NamespaceRewrite {
        file: "app/Providers/EventServiceProvider.php",
        from: r"use Laravel\Lumen\Providers\EventServiceProvider as ServiceProvider;",
        to: r"use Illuminate\Foundation\Support\Providers\EventServiceProvider as ServiceProvider;",
    },
    NamespaceRewrite {
        file: "app/Http/Controllers/Controller.php",
        from: r"use Laravel\Lumen\Routing\Controller as BaseController;",
        to: r"use Illuminate\Routing\Controller as BaseController;",
    },
];

impl NamespaceRewrite {
    /// Replaces the first occurrence only. Returns `None` if the import is absent.
    pub fn apply(&self, source: &str) -> Option<String> {
        source
            .contains(self.from)
            .then(|| source.replacen(self.from, self.to, 1))
    }
}

/// Stage: applies every rewrite in `NAMESPACE_REWRITES` under the destination.
///
/// Files are handled independently. A file without the Lumen import is left
/// as is.
///
/// # Errors
///
/// After all files have been attempted, fails with a `FileSystem` error
/// listing every file that could not be read or written.
pub fn rewrite_namespaces(descriptor: &ProjectDescriptor) -> Result<()> {
    let mut failed = Vec::new();

    for rewrite in &NAMESPACE_REWRITES {
        let path = descriptor.destination_path(rewrite.file);
        let result = io::read_file_to_string(&path).and_then(|source| match rewrite.apply(&source) {
            Some(updated) => io::write_string_to_file(&path, &updated).map(|_| true),
            None => Ok(false),
        });
        match result {
            Ok(true) => debug!("Rewrote Lumen import in {:?}", path),
            Ok(false) => warn!("No Lumen import found in {:?}, left unchanged", path),
            Err(e) => {
                error!("Failed to rewrite {:?}: {:#}", path, e);
                failed.push(rewrite.file);
            }
        }
    }

    if !failed.is_empty() {
        return Err(MigrateError::FileSystem(format!(
            "Could not rewrite namespaces in: {}",
            failed.join(", ")
        ))
        .into());
    }
    info!("Rewrote Lumen namespaces in {} file(s)", NAMESPACE_REWRITES.len());
    Ok(())
}
