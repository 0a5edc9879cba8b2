use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::{
    backend::{BlobStore, RecordStore},
    config::normalize_base_url,
    error::{GalleryError, GalleryResult},
    model::{Counter, ImageRecord, NewImage},
};

const IMAGES_TABLE: &str = "images";
const INCREMENT_FUNCTION: &str = "increment_image_counter";

/// Hosted backend: PostgREST-style record API plus object storage, both
/// reached with the project's API key.
#[derive(Clone, Debug)]
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    bucket: String,
}

#[derive(Debug, Serialize)]
struct IncrementParams<'a> {
    image_id: &'a str,
    counter: &'static str,
}

async fn assert_ok_response(response: reqwest::Response) -> GalleryResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(GalleryError::Backend(format!("request failed: {status} {text}")))
}

fn auth_headers(api_key: &str) -> GalleryResult<HeaderMap> {
    let invalid = |_| GalleryError::Config("API key contains invalid header characters".into());
    let mut headers = HeaderMap::new();
    headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid)?);
    headers.insert(
        reqwest::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(invalid)?,
    );
    Ok(headers)
}

impl RemoteBackend {
    pub fn new(url: Url, api_key: String, bucket: String) -> GalleryResult<Self> {
        let client = Client::builder()
            .user_agent(format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))
            .default_headers(auth_headers(&api_key)?)
            .build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(url.as_str()),
            bucket,
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{path}", self.base_url)
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            key.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl RecordStore for RemoteBackend {
    async fn list_images(&self) -> GalleryResult<Vec<ImageRecord>> {
        let response = self
            .client
            .get(self.rest_url(IMAGES_TABLE))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let images: Vec<ImageRecord> = response.json().await?;
        debug!(count = images.len(), "fetched image records");
        Ok(images)
    }

    async fn insert_image(&self, image: NewImage) -> GalleryResult<ImageRecord> {
        let response = self
            .client
            .post(self.rest_url(IMAGES_TABLE))
            .header("Prefer", "return=representation")
            .json(&image)
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let rows: Vec<ImageRecord> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GalleryError::Backend("insert returned no record".into()))
    }

    async fn increment_counter(&self, id: &str, counter: Counter) -> GalleryResult<Option<u64>> {
        let response = self
            .client
            .post(self.rest_url(&format!("rpc/{INCREMENT_FUNCTION}")))
            .json(&IncrementParams {
                image_id: id,
                counter: counter.column(),
            })
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let value: Option<u64> = response.json().await?;
        Ok(value)
    }
}

#[async_trait]
impl BlobStore for RemoteBackend {
    async fn put(&self, key: &str, data: &[u8], content_type: Option<&str>) -> GalleryResult<()> {
        let response = self
            .client
            .post(self.object_url(key))
            .header(CONTENT_TYPE, content_type.unwrap_or("application/octet-stream"))
            .header("x-upsert", "false")
            .body(data.to_vec())
            .send()
            .await?;
        assert_ok_response(response).await?;
        debug!(key, bytes = data.len(), "stored object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            key.trim_start_matches('/')
        )
    }
}
