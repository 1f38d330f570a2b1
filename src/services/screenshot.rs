use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A preview image found on disk together with the digest of its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub path: PathBuf,
    pub sha256: String,
}

impl Screenshot {
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

pub async fn file_sha256(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Reads `file_name` under the media directory. A missing or unreadable file
/// is logged and yields `None`.
pub async fn load_screenshot(media_path: &Path, file_name: &str) -> Option<Screenshot> {
    let path = media_path.join(file_name);

    match file_sha256(&path).await {
        Ok(sha256) => Some(Screenshot { path, sha256 }),
        Err(e) => {
            warn!("Cannot read preview image {}: {}", path.display(), e);
            None
        }
    }
}
