//! In-memory backends with switchable failures, for store and page tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    backend::{BlobStore, RecordStore},
    error::{GalleryError, GalleryResult},
    model::{Counter, ImageRecord, NewImage},
};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Record created `minute` minutes after a fixed base time.
pub fn sample_image(id: &str, category: &str, likes: u64, minute: i64) -> ImageRecord {
    ImageRecord {
        id: id.to_string(),
        title: format!("Image {id}"),
        category: category.to_string(),
        image_url: format!("https://cdn.example.com/images/{id}.jpg"),
        description: Some(format!("Description of {id}")),
        likes,
        views: 0,
        created_at: base_time() + Duration::minutes(minute),
    }
}

#[derive(Default)]
pub struct MemoryRecords {
    rows: Mutex<Vec<ImageRecord>>,
    inserted: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_increment: AtomicBool,
}

impl MemoryRecords {
    pub fn with_rows(rows: Vec<ImageRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn rows(&self) -> Vec<ImageRecord> {
        self.rows.lock().unwrap().clone()
    }

    pub fn set_likes(&self, id: &str, likes: u64) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            row.likes = likes;
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecords {
    async fn list_images(&self) -> GalleryResult<Vec<ImageRecord>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(GalleryError::Backend("connection refused".into()));
        }
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_image(&self, image: NewImage) -> GalleryResult<ImageRecord> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(GalleryError::Backend("row violates policy".into()));
        }
        let n = self.inserted.fetch_add(1, Ordering::SeqCst) as i64;
        let record = ImageRecord {
            id: format!("new-{n}"),
            title: image.title,
            category: image.category,
            image_url: image.image_url,
            description: image.description,
            likes: 0,
            views: 0,
            created_at: base_time() + Duration::days(1) + Duration::minutes(n),
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn increment_counter(&self, id: &str, counter: Counter) -> GalleryResult<Option<u64>> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(GalleryError::Backend("update failed".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|row| row.id == id).map(|row| {
            let value = row.counter(counter) + 1;
            row.set_counter(counter, value);
            value
        }))
    }
}

#[derive(Default)]
pub struct MemoryBlobs {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_put: AtomicBool,
}

impl MemoryBlobs {
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn put(&self, key: &str, data: &[u8], _content_type: Option<&str>) -> GalleryResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(GalleryError::Backend("bucket not found".into()));
        }
        self.objects.lock().unwrap().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.example.com/{key}")
    }
}
