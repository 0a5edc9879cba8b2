use thiserror::Error;

use crate::{
    gallery::store::{ImageMetadata, UploadFile},
    image_processing::{detect_mime_type, get_dimensions},
    model::Category,
};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Category is required")]
    MissingCategory,
    #[error("Unknown category `{0}`")]
    UnknownCategory(String),
    #[error("Choose an image to upload")]
    MissingFile,
    #[error("Only image files can be uploaded")]
    NotAnImage,
    #[error("Image is {size} bytes, the limit is 10 MB")]
    TooLarge { size: usize },
    #[error("Image could not be read: {0}")]
    Unreadable(String),
    #[error("An upload is already in progress")]
    AlreadySubmitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Empty,
    FileSelected,
    Validating,
    Submitting,
    Done,
    Failed(String),
}

/// What the form hands to whoever performs the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file: UploadFile,
    pub metadata: ImageMetadata,
}

/// Upload form state. Holds what the user entered and never talks to the
/// backend.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    file: Option<UploadFile>,
    phase: FormPhase,
}

fn is_image(file: &UploadFile) -> bool {
    let declared = file
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.starts_with("image/"));
    declared || detect_mime_type(&file.bytes).is_some()
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn file(&self) -> Option<&UploadFile> {
        self.file.as_ref()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    /// An empty value clears the selection.
    pub fn set_category(&mut self, raw: &str) -> Result<(), FormError> {
        let raw = raw.trim();
        if raw.is_empty() {
            self.category = None;
            return Ok(());
        }
        let category = raw
            .parse::<Category>()
            .map_err(|err| FormError::UnknownCategory(err.0))?;
        self.category = Some(category);
        Ok(())
    }

    /// Non-image files are refused and leave the current selection alone.
    pub fn select_file(&mut self, file: UploadFile) -> Result<(), FormError> {
        if !is_image(&file) {
            return Err(FormError::NotAnImage);
        }
        self.file = Some(file);
        self.phase = FormPhase::FileSelected;
        Ok(())
    }

    /// Whether the submit button is enabled.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.category.is_some() && self.file.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Validates the entered data and moves to `Submitting`. On error the
    /// form moves to `Failed` with the message.
    pub fn submit(&mut self) -> Result<UploadPayload, FormError> {
        if self.is_submitting() {
            return Err(FormError::AlreadySubmitting);
        }
        self.phase = FormPhase::Validating;
        match self.validate() {
            Ok(payload) => {
                self.phase = FormPhase::Submitting;
                Ok(payload)
            }
            Err(err) => {
                self.phase = FormPhase::Failed(err.to_string());
                Err(err)
            }
        }
    }

    fn validate(&self) -> Result<UploadPayload, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }
        let category = self.category.ok_or(FormError::MissingCategory)?;
        let file = self.file.as_ref().ok_or(FormError::MissingFile)?;
        if file.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(FormError::TooLarge {
                size: file.bytes.len(),
            });
        }
        if let Some(mime_type) = detect_mime_type(&file.bytes) {
            get_dimensions(&file.bytes, mime_type).map_err(|err| FormError::Unreadable(err.to_string()))?;
        }
        let description = self.description.trim();
        Ok(UploadPayload {
            file: file.clone(),
            metadata: ImageMetadata {
                title: title.to_string(),
                description: (!description.is_empty()).then(|| description.to_string()),
                category,
            },
        })
    }

    /// Upload succeeded: clear the form.
    pub fn complete(&mut self) {
        *self = Self {
            phase: FormPhase::Done,
            ..Self::default()
        };
    }

    /// Upload failed: keep everything so the user can retry.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = FormPhase::Failed(message.into());
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.phase {
            FormPhase::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
