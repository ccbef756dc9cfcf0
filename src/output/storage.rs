//! Writing fetched resources into the mirror tree

use crate::url::{local_path, INDEX_FILE};
use crate::{MirrorError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Returns where `url` is stored under `output_dir`
///
/// A mapped path that already exists as a directory resolves to the
/// `index.html` inside it.
pub fn target_path(output_dir: &Path, url: &Url) -> PathBuf {
    let target = output_dir.join(local_path(url));
    if target.is_dir() {
        target.join(INDEX_FILE)
    } else {
        target
    }
}

/// Writes `body` to the local path of `url`, creating parent directories
///
/// # Arguments
///
/// * `output_dir` - Root of the mirror tree
/// * `url` - The resource the body was fetched from
/// * `body` - Bytes to store
///
/// # Returns
///
/// * `Ok(PathBuf)` - Where the body was written
/// * `Err(MirrorError::Write)` - A directory or the file could not be written
pub async fn save_resource(output_dir: &Path, url: &Url, body: &[u8]) -> Result<PathBuf> {
    let target = target_path(output_dir, url);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| MirrorError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(&target, body)
        .await
        .map_err(|source| MirrorError::Write {
            path: target.clone(),
            source,
        })?;

    Ok(target)
}
