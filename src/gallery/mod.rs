pub mod store;
pub mod upload_form;
pub mod view;

pub use store::{GalleryState, GalleryStore, ImageMetadata, UploadFile};
pub use upload_form::{FormError, FormPhase, MAX_UPLOAD_BYTES, UploadForm, UploadPayload};
pub use view::{CategoryFilter, SortOrder, UnknownSortOrder, browse, filter_images, sort_images};
