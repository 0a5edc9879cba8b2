pub mod routes;
pub mod templates;

use std::{path::PathBuf, sync::Arc};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use maud::Markup;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::{
    error::{GalleryError, GalleryResult},
    gallery::{CategoryFilter, FormError, GalleryStore, MAX_UPLOAD_BYTES, SortOrder, UploadFile, UploadForm, browse},
    model::ImageRecord,
};

/// Room for the text fields and multipart framing around the file.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;
const UPLOADED_NOTICE: &str = "Success! Your image has been uploaded successfully.";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<GalleryStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub notice: Option<String>,
}

impl BrowseQuery {
    /// Unrecognised values fall back to showing everything, newest first.
    fn params(&self) -> (CategoryFilter, SortOrder) {
        let filter = self
            .category
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let sort = self
            .sort
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        (filter, sort)
    }

    fn notice(&self) -> Option<&'static str> {
        match self.notice.as_deref() {
            Some("uploaded") => Some(UPLOADED_NOTICE),
            _ => None,
        }
    }
}

pub fn router(state: AppState, files_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/", get(gallery))
        .route("/refresh", post(refresh))
        .route("/images/{id}", get(show_image))
        .route("/images/{id}/open", post(open_image))
        .route("/images/{id}/like", post(like_image))
        .route(
            "/upload",
            get(upload_page)
                .post(handle_image_upload)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/images", get(list_images))
        .fallback(not_found);
    let router = match files_dir {
        Some(dir) => router.nest_service("/files", ServeDir::new(dir)),
        None => router,
    };
    router.with_state(state)
}

pub async fn gallery(State(state): State<AppState>, Query(query): Query<BrowseQuery>) -> Markup {
    let (filter, sort) = query.params();
    let snapshot = state.store.snapshot().await;
    templates::gallery_page(&snapshot, filter, sort, query.notice())
}

pub async fn refresh(State(state): State<AppState>) -> Redirect {
    state.store.fetch_all().await;
    Redirect::to("/")
}

pub async fn open_image(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    state.store.increment_views(&id).await;
    Redirect::to(&routes::image_path(&id))
}

pub async fn show_image(State(state): State<AppState>, Path(id): Path<String>) -> GalleryResult<Markup> {
    let image = state.store.find(&id).await.ok_or(GalleryError::NotFound)?;
    Ok(templates::image_page(&image))
}

pub async fn like_image(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    state.store.increment_likes(&id).await;
    Redirect::to(&routes::image_path(&id))
}

pub async fn list_images(State(state): State<AppState>, Query(query): Query<BrowseQuery>) -> Json<Vec<ImageRecord>> {
    let (filter, sort) = query.params();
    let images = state.store.images().await;
    Json(browse(&images, filter, sort).into_iter().cloned().collect())
}

pub async fn upload_page() -> Markup {
    templates::upload_page(&UploadForm::new())
}

/// Reads every part of the form. A rejected value is kept aside and the
/// remaining parts are still read, so the page can show them again.
async fn read_upload_form(form: &mut UploadForm, multipart: &mut Multipart) -> Result<Option<FormError>, String> {
    let mut rejected = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| format!("Could not read the form: {err}"))?
    {
        let name = field.name().unwrap_or("").to_string();
        let outcome = match name.as_str() {
            "file" => {
                let content_type = field.content_type().map(|value| value.to_string());
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| format!("Could not read the file: {err}"))?;
                // browsers send an empty part when no file was chosen
                if bytes.is_empty() {
                    continue;
                }
                form.select_file(UploadFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                })
            }
            "title" => {
                form.set_title(&field.text().await.map_err(|err| err.to_string())?);
                Ok(())
            }
            "description" => {
                form.set_description(&field.text().await.map_err(|err| err.to_string())?);
                Ok(())
            }
            "category" => form.set_category(&field.text().await.map_err(|err| err.to_string())?),
            _ => Ok(()),
        };
        if let Err(err) = outcome {
            rejected.get_or_insert(err);
        }
    }
    Ok(rejected)
}

pub async fn handle_image_upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut form = UploadForm::new();
    let rejected = match read_upload_form(&mut form, &mut multipart).await {
        Ok(rejected) => rejected.map(|err| err.to_string()),
        Err(message) => Some(message),
    };
    if let Some(message) = rejected {
        warn!("rejected upload form: {message}");
        form.fail(message);
        return (StatusCode::BAD_REQUEST, templates::upload_page(&form)).into_response();
    }

    let payload = match form.submit() {
        Ok(payload) => payload,
        Err(err) => {
            info!("upload form invalid: {err}");
            return (StatusCode::UNPROCESSABLE_ENTITY, templates::upload_page(&form)).into_response();
        }
    };

    match state.store.upload(payload.file, payload.metadata).await {
        Ok(_) => {
            form.complete();
            Redirect::to("/?notice=uploaded").into_response()
        }
        Err(err) => {
            form.fail(err.to_string());
            (StatusCode::BAD_GATEWAY, templates::upload_page(&form)).into_response()
        }
    }
}

pub async fn not_found() -> GalleryError {
    GalleryError::NotFound
}
