pub mod hash;
pub mod local_records;
pub mod remote;
pub mod storage;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    config::{BackendConfig, GalleryConfig},
    error::GalleryResult,
    model::{Counter, ImageRecord, NewImage},
};

pub use hash::{compute_hash, random_file_stem};
pub use local_records::LocalRecords;
pub use remote::RemoteBackend;
pub use storage::LocalFileStorage;

/// Structured access to the `images` table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records, newest `created_at` first.
    async fn list_images(&self) -> GalleryResult<Vec<ImageRecord>>;

    /// Inserts a record and returns it as stored, with id, timestamp and
    /// zeroed counters assigned by the backend.
    async fn insert_image(&self, image: NewImage) -> GalleryResult<ImageRecord>;

    /// Atomically adds one to a counter. `None` when no record has `id`.
    async fn increment_counter(&self, id: &str, counter: Counter) -> GalleryResult<Option<u64>>;
}

/// Object storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: &[u8], content_type: Option<&str>) -> GalleryResult<()>;

    fn public_url(&self, key: &str) -> String;
}

pub type Backends = (Arc<dyn RecordStore>, Arc<dyn BlobStore>);

pub fn build_backends(config: &GalleryConfig) -> GalleryResult<Backends> {
    match &config.backend {
        BackendConfig::Local => {
            info!(data_dir = %config.data_dir.display(), "using local backend");
            let records: Arc<dyn RecordStore> = Arc::new(LocalRecords::new(config.data_dir.join("records")));
            let storage: Arc<dyn BlobStore> = Arc::new(LocalFileStorage::new(config.files_dir(), config.files_url()));
            Ok((records, storage))
        }
        BackendConfig::Remote {
            url,
            api_key,
            bucket,
        } => {
            info!(%url, bucket = %bucket, "using remote backend");
            let remote = Arc::new(RemoteBackend::new(url.clone(), api_key.clone(), bucket.clone())?);
            let records: Arc<dyn RecordStore> = remote.clone();
            let blobs: Arc<dyn BlobStore> = remote;
            Ok((records, blobs))
        }
    }
}
