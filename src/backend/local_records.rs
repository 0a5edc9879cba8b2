use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    backend::RecordStore,
    error::GalleryResult,
    model::{Counter, ImageRecord, NewImage},
};

/// Image records kept as one JSON document per image.
#[derive(Debug)]
pub struct LocalRecords {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalRecords {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    fn record_path(&self, id: &str) -> Option<PathBuf> {
        // ids become file names; refuse anything that could leave the directory
        let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        valid.then(|| self.dir.join(format!("{id}.json")))
    }

    async fn read_record(&self, path: &Path) -> GalleryResult<Option<ImageRecord>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_record(&self, record: &ImageRecord) -> GalleryResult<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.json", record.id));
        let payload = serde_json::to_vec_pretty(record)?;
        fs::write(path, payload).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for LocalRecords {
    async fn list_images(&self) -> GalleryResult<Vec<ImageRecord>> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut records = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<ImageRecord>(&bytes) {
                Ok(record) => records.push(record),
                Err(err) => warn!(path = %path.display(), "skipping unreadable record: {err}"),
            }
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn insert_image(&self, image: NewImage) -> GalleryResult<ImageRecord> {
        let record = ImageRecord {
            id: Uuid::new_v4().to_string(),
            title: image.title,
            category: image.category,
            image_url: image.image_url,
            description: image.description,
            likes: 0,
            views: 0,
            created_at: Utc::now(),
        };
        let _guard = self.write_lock.lock().await;
        self.write_record(&record).await?;
        debug!(id = %record.id, "inserted image record");
        Ok(record)
    }

    async fn increment_counter(&self, id: &str, counter: Counter) -> GalleryResult<Option<u64>> {
        let Some(path) = self.record_path(id) else {
            return Ok(None);
        };
        let _guard = self.write_lock.lock().await;
        let Some(mut record) = self.read_record(&path).await? else {
            return Ok(None);
        };
        let value = record.counter(counter).saturating_add(1);
        record.set_counter(counter, value);
        self.write_record(&record).await?;
        Ok(Some(value))
    }
}
