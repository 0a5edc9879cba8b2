use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Failed to load images: {0}")]
    Fetch(String),
    #[error("Failed to store image file: {0}")]
    Upload(String),
    #[error("Failed to save image: {0}")]
    Insert(String),
    #[error("Backend Error: {0}")]
    Backend(String),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Not Found")]
    NotFound,
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Serde: JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("URL Error: {0}")]
    Url(#[from] url::ParseError),
}

pub type GalleryResult<T> = std::result::Result<T, GalleryError>;

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let status = match self {
            GalleryError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = crate::pages::templates::error_page(status, &self.to_string());
        (status, body).into_response()
    }
}
