//! Server distribution install.
//!
//! Getting a server onto disk needs two collaborators this library does not
//! provide itself: something that turns a distribution coordinate into a
//! local archive (a repository resolver, a download cache) and something
//! that unpacks the archive. Both are narrow traits so callers can plug in
//! whatever their build environment offers, and tests can substitute mocks.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Resolves a distribution coordinate to a local archive.
#[async_trait]
pub trait DistributionResolver: Send + Sync {
    /// Resolves a coordinate such as `org.wildfly:wildfly-dist:zip:8.1.0.Final`
    /// to an archive on the local filesystem.
    async fn resolve(&self, coordinate: &str) -> Result<PathBuf>;
}

/// Unpacks a server archive into a target directory.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extracts `archive` so that `target` becomes the server home.
    ///
    /// The extractor creates `target`; on failure it should leave no partial
    /// tree behind.
    async fn extract(&self, archive: &Path, target: &Path) -> Result<()>;
}

/// Installs a server distribution into `target`.
///
/// A non-empty target directory is treated as a previous install and wiped
/// first, so installing over an older version replaces it. On extraction
/// failure the target is removed rather than left half populated.
#[tracing::instrument(skip(resolver, extractor, target), fields(target = %target.display()))]
pub async fn install_server(
    resolver: &dyn DistributionResolver,
    extractor: &dyn ArchiveExtractor,
    coordinate: &str,
    target: &Path,
) -> Result<PathBuf> {
    tracing::info!("Installing server distribution");

    let archive = resolver.resolve(coordinate).await?;
    if !archive.exists() {
        return Err(Error::Install(format!(
            "Resolved archive '{}' does not exist",
            archive.display()
        )));
    }

    if target.exists() && !is_empty_dir(target)? {
        tracing::warn!("Target directory is not empty, replacing the previous install");
        std::fs::remove_dir_all(target).map_err(|e| {
            Error::Install(format!(
                "Failed to clear target '{}': {}",
                target.display(),
                e
            ))
        })?;
    }

    if let Err(e) = extractor.extract(&archive, target).await {
        // Do not leave a half populated server home behind
        if target.exists() {
            let _ = std::fs::remove_dir_all(target);
        }
        return Err(e);
    }

    if !target.is_dir() {
        return Err(Error::Install(format!(
            "Extraction produced no directory at '{}'",
            target.display()
        )));
    }

    tracing::info!("Server distribution installed");
    Ok(target.to_path_buf())
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    let mut entries = std::fs::read_dir(path)
        .map_err(|e| Error::Install(format!("Failed to read '{}': {}", path.display(), e)))?;
    Ok(entries.next().is_none())
}
