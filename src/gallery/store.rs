use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::{
    backend::{BlobStore, RecordStore, random_file_stem},
    error::{GalleryError, GalleryResult},
    image_processing::resolve_extension,
    model::{Category, Counter, ImageRecord, NewImage},
};

/// A file as received from the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
}

#[derive(Debug, Clone, Default)]
pub struct GalleryState {
    /// Newest first.
    pub images: Vec<ImageRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Owns the in-memory copy of the image table and every write to the
/// backend. Pages only ever read snapshots of it.
pub struct GalleryStore {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    state: RwLock<GalleryState>,
}

impl GalleryStore {
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            records,
            blobs,
            state: RwLock::new(GalleryState {
                loading: true,
                ..Default::default()
            }),
        }
    }

    /// Creates the store and performs the initial fetch.
    pub async fn open(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let store = Self::new(records, blobs);
        store.fetch_all().await;
        store
    }

    /// Replaces the cache with the backend's records. Failures land in
    /// `error` and keep the previous cache.
    pub async fn fetch_all(&self) {
        self.state.write().await.loading = true;
        let result = self.records.list_images().await;

        let mut state = self.state.write().await;
        match result {
            Ok(images) => {
                debug!(count = images.len(), "image cache refreshed");
                state.images = images;
                state.error = None;
            }
            Err(err) => {
                let err = GalleryError::Fetch(err.to_string());
                warn!("{err}");
                state.error = Some(err.to_string());
            }
        }
        state.loading = false;
    }

    /// Stores the file, then inserts its record. If the insert fails the
    /// stored file is left behind.
    pub async fn upload(&self, file: UploadFile, metadata: ImageMetadata) -> GalleryResult<ImageRecord> {
        let ext = resolve_extension(&file.file_name, file.content_type.as_deref());
        let key = format!("images/{}.{ext}", random_file_stem(&file.file_name));

        self.blobs
            .put(&key, &file.bytes, file.content_type.as_deref())
            .await
            .map_err(|err| GalleryError::Upload(err.to_string()))?;
        let image_url = self.blobs.public_url(&key);

        let new_image = NewImage {
            title: metadata.title,
            category: metadata.category.slug().to_string(),
            image_url,
            description: metadata.description,
        };
        let record = match self.records.insert_image(new_image).await {
            Ok(record) => record,
            Err(err) => {
                warn!(key = %key, "image record insert failed, stored file left orphaned: {err}");
                return Err(GalleryError::Insert(err.to_string()));
            }
        };

        self.state.write().await.images.insert(0, record.clone());
        info!(id = %record.id, key = %key, "image uploaded");
        Ok(record)
    }

    pub async fn increment_views(&self, id: &str) {
        self.increment(id, Counter::Views).await
    }

    pub async fn increment_likes(&self, id: &str) {
        self.increment(id, Counter::Likes).await
    }

    async fn increment(&self, id: &str, counter: Counter) {
        match self.records.increment_counter(id, counter).await {
            Ok(Some(value)) => {
                let mut state = self.state.write().await;
                if let Some(image) = state.images.iter_mut().find(|image| image.id == id) {
                    image.set_counter(counter, value);
                }
            }
            Ok(None) => debug!(id, counter = counter.column(), "no image to increment"),
            Err(err) => error!(id, "error incrementing {}: {err}", counter.column()),
        }
    }

    pub async fn snapshot(&self) -> GalleryState {
        self.state.read().await.clone()
    }

    pub async fn images(&self) -> Vec<ImageRecord> {
        self.state.read().await.images.clone()
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn find(&self, id: &str) -> Option<ImageRecord> {
        self.state
            .read()
            .await
            .images
            .iter()
            .find(|image| image.id == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::{
        image_processing::tiny_png,
        test_utils::{MemoryBlobs, MemoryRecords, sample_image},
    };

    fn seeded() -> Arc<MemoryRecords> {
        Arc::new(MemoryRecords::with_rows(vec![
            sample_image("old", "kids", 5, 0),
            sample_image("mid", "weddings", 2, 10),
            sample_image("new", "babies", 0, 20),
        ]))
    }

    async fn open(records: Arc<MemoryRecords>, blobs: Arc<MemoryBlobs>) -> GalleryStore {
        GalleryStore::open(records, blobs).await
    }

    fn png_file(name: &str) -> UploadFile {
        UploadFile {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: tiny_png(),
        }
    }

    fn metadata(title: &str, category: Category) -> ImageMetadata {
        ImageMetadata {
            title: title.to_string(),
            description: None,
            category,
        }
    }

    #[tokio::test]
    async fn new_store_starts_loading() {
        let store = GalleryStore::new(seeded(), Arc::new(MemoryBlobs::default()));
        assert!(store.loading().await);
        assert!(store.images().await.is_empty());
    }

    #[tokio::test]
    async fn open_fetches_newest_first() {
        let store = open(seeded(), Arc::new(MemoryBlobs::default())).await;
        let state = store.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.error, None);
        let ids: Vec<_> = state.images.iter().map(|image| image.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert!(state.images.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_cache_and_sets_error() {
        let records = seeded();
        let store = open(records.clone(), Arc::new(MemoryBlobs::default())).await;

        records.fail_list.store(true, Ordering::SeqCst);
        store.fetch_all().await;

        let state = store.snapshot().await;
        assert_eq!(state.images.len(), 3);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Failed to load images: Backend Error: connection refused"));

        records.fail_list.store(false, Ordering::SeqCst);
        store.fetch_all().await;
        assert_eq!(store.error().await, None);
    }

    #[tokio::test]
    async fn upload_prepends_backend_record() {
        let blobs = Arc::new(MemoryBlobs::default());
        let store = open(seeded(), blobs.clone()).await;

        let record = store
            .upload(png_file("cake.png"), metadata("T", Category::Weddings))
            .await
            .unwrap();

        let images = store.images().await;
        assert_eq!(images.len(), 4);
        assert_eq!(images[0], record);
        assert_eq!(images[0].title, "T");
        assert_eq!(images[0].category, "weddings");
        assert_eq!((images[0].likes, images[0].views), (0, 0));

        let keys = blobs.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("images/") && keys[0].ends_with(".png"));
        assert_eq!(images[0].image_url, format!("https://cdn.example.com/{}", keys[0]));
    }

    #[tokio::test]
    async fn odd_file_names_still_give_loadable_urls() {
        let blobs = Arc::new(MemoryBlobs::default());
        let store = open(seeded(), blobs.clone()).await;

        let png = store
            .upload(png_file("cake.png#1"), metadata("T", Category::Kids))
            .await
            .unwrap();
        let mut jpeg = png_file("a.p?g");
        jpeg.content_type = Some("image/jpeg".to_string());
        let jpg = store.upload(jpeg, metadata("T", Category::Kids)).await.unwrap();

        let keys = blobs.keys();
        for (record, ext) in [(&png, ".png"), (&jpg, ".jpg")] {
            let key = record.image_url.trim_start_matches("https://cdn.example.com/");
            assert!(keys.iter().any(|stored| stored == key));
            assert!(key.ends_with(ext));
            assert!(!key.contains(['#', '?', '%', ' ']));
        }
    }

    #[tokio::test]
    async fn storage_failure_skips_insert() {
        let records = seeded();
        let blobs = Arc::new(MemoryBlobs::default());
        blobs.fail_put.store(true, Ordering::SeqCst);
        let store = open(records.clone(), blobs).await;

        let err = store
            .upload(png_file("cake.png"), metadata("T", Category::Kids))
            .await
            .unwrap_err();

        assert!(matches!(err, GalleryError::Upload(_)));
        assert_eq!(records.rows().len(), 3);
        assert_eq!(store.images().await.len(), 3);
    }

    #[tokio::test]
    async fn insert_failure_orphans_stored_file() {
        let records = seeded();
        records.fail_insert.store(true, Ordering::SeqCst);
        let blobs = Arc::new(MemoryBlobs::default());
        let store = open(records.clone(), blobs.clone()).await;

        let err = store
            .upload(png_file("cake.jpeg"), metadata("T", Category::Kids))
            .await
            .unwrap_err();

        assert!(matches!(err, GalleryError::Insert(_)));
        assert!(err.to_string().contains("row violates policy"));
        assert_eq!(blobs.keys().len(), 1);
        assert_eq!(store.images().await.len(), 3);
    }

    #[tokio::test]
    async fn sequential_likes_add_up() {
        let store = open(seeded(), Arc::new(MemoryBlobs::default())).await;
        store.increment_likes("old").await;
        store.increment_likes("old").await;
        assert_eq!(store.find("old").await.unwrap().likes, 7);
    }

    #[tokio::test]
    async fn local_counter_follows_backend_value() {
        let records = seeded();
        let store = open(records.clone(), Arc::new(MemoryBlobs::default())).await;
        // another client liked it in the meantime
        records.set_likes("mid", 40);
        store.increment_likes("mid").await;
        assert_eq!(store.find("mid").await.unwrap().likes, 41);
    }

    #[tokio::test]
    async fn failed_increment_leaves_cache_untouched() {
        let records = seeded();
        let store = open(records.clone(), Arc::new(MemoryBlobs::default())).await;
        records.fail_increment.store(true, Ordering::SeqCst);

        store.increment_likes("old").await;

        assert_eq!(store.find("old").await.unwrap().likes, 5);
    }

    #[tokio::test]
    async fn unknown_id_increment_changes_nothing() {
        let store = open(seeded(), Arc::new(MemoryBlobs::default())).await;
        let before = store.images().await;
        store.increment_views("nonexistent").await;
        assert_eq!(store.images().await, before);
    }

    #[tokio::test]
    async fn views_increment_patches_only_matching_record() {
        let store = open(seeded(), Arc::new(MemoryBlobs::default())).await;
        store.increment_views("mid").await;
        let images = store.images().await;
        let views: Vec<_> = images.iter().map(|image| (image.id.as_str(), image.views)).collect();
        assert_eq!(views, vec![("new", 0), ("mid", 1), ("old", 0)]);
    }
}
