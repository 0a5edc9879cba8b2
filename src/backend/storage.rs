use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{backend::BlobStore, config::normalize_base_url, error::GalleryResult};

/// Blob store on the local filesystem. Files are served back by the
/// application under `base_url`.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self { base_dir, base_url }
    }

    pub fn resolve_path(&self, key: &str) -> PathBuf {
        let normalized = key.trim_start_matches('/');
        self.base_dir.join(Path::new(normalized))
    }
}

#[async_trait]
impl BlobStore for LocalFileStorage {
    async fn put(&self, key: &str, data: &[u8], _content_type: Option<&str>) -> GalleryResult<()> {
        let path = self.resolve_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        let base = normalize_base_url(&self.base_url);
        let key = key.trim_start_matches('/');
        format!("{base}/{key}")
    }
}
