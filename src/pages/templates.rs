use axum::http::StatusCode;
use chrono_humanize::HumanTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    gallery::{CategoryFilter, GalleryState, SortOrder, UploadForm, browse},
    model::{Category, ImageRecord},
    pages::routes::{image_open_path, like_path},
};

const GALLERY_CSS: &str = include_str!("../../templates/gallery.css");
const GALLERY_JS: &str = include_str!("../../templates/gallery.js");
const SITE_NAME: &str = "PromptWala";

pub fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - " (SITE_NAME) }
                style { (PreEscaped(GALLERY_CSS)) }
                script { (PreEscaped(GALLERY_JS)) }
            }
            body {
                header.header {
                    a.header__title href="/" { (SITE_NAME) }
                    a.button.button--primary href="/upload" { "Upload Image" }
                }
                main { (body) }
            }
        }
    }
}

fn category_badge(category: &str, style_class: &str) -> Markup {
    html! { span.badge.(style_class) { (category) } }
}

/// Opening a card counts a view, so it posts instead of linking.
pub fn image_card(image: &ImageRecord) -> Markup {
    html! {
        form.card method="post" action=(image_open_path(&image.id)) data-image-id=(image.id) {
            button.card__open type="submit" {
                span.card__media {
                    img src=(image.image_url) alt=(image.title) loading="lazy";
                    (category_badge(&image.category, image.style().css_class()))
                }
                span.card__body {
                    strong.card__title { (image.title) }
                    span.card__description { (image.description.as_deref().unwrap_or("")) }
                    span.card__stats {
                        span {
                            span title="Likes" { "♥ " (image.likes) }
                            " "
                            span title="Views" { "👁 " (image.views) }
                        }
                        span.card__age { (HumanTime::from(image.created_at)) }
                    }
                }
            }
        }
    }
}

fn browse_controls(count: usize, filter: CategoryFilter, sort: SortOrder) -> Markup {
    html! {
        .toolbar {
            span.count { (count) " images" }
            form method="get" action="/" {
                select name="category" data-autosubmit {
                    option value="all" selected[filter == CategoryFilter::All] { "All Categories" }
                    @for category in Category::ALL {
                        option value=(category.slug()) selected[filter == CategoryFilter::Only(category)] {
                            (category.label())
                        }
                    }
                }
                select name="sort" data-autosubmit {
                    @for order in [SortOrder::Recent, SortOrder::Popular] {
                        option value=(order.slug()) selected[sort == order] { (order.label()) }
                    }
                }
                noscript { button.button type="submit" { "Apply" } }
            }
            form method="post" action="/refresh" {
                button.button type="submit" { "Refresh" }
            }
        }
    }
}

pub fn gallery_page(state: &GalleryState, filter: CategoryFilter, sort: SortOrder, notice: Option<&str>) -> Markup {
    if state.loading && state.images.is_empty() {
        return layout("Gallery", html! {
            .panel { h3 { "Loading images..." } }
        });
    }
    if let Some(error) = &state.error {
        return layout("Gallery", html! {
            .panel {
                h3 { "Error loading images" }
                p { (error) }
                form method="post" action="/refresh" {
                    button.button type="submit" { "Try again" }
                }
            }
        });
    }

    let visible = browse(&state.images, filter, sort);
    layout("Gallery", html! {
        @if let Some(notice) = notice {
            .notice.notice--success { (notice) }
        }
        (browse_controls(visible.len(), filter, sort))
        @if visible.is_empty() {
            .panel {
                h3 { "No images found" }
                p {
                    @if filter == CategoryFilter::All {
                        "Be the first to upload an image!"
                    } @else {
                        "No images in this category yet. Try a different filter or upload some images."
                    }
                }
            }
        } @else {
            .grid {
                @for image in visible {
                    (image_card(image))
                }
            }
        }
    })
}

pub fn image_page(image: &ImageRecord) -> Markup {
    layout(&image.title, html! {
        .overlay data-image-id=(image.id) {
            .overlay__image {
                img src=(image.image_url) alt=(image.title);
            }
            .overlay__details {
                div {
                    (category_badge(&image.category, image.style().css_class()))
                    @if let Some(description) = &image.description {
                        " "
                        button.button type="button" data-copy=(description) { "Copy Prompt" }
                    }
                }
                h2 { (image.title) }
                @if let Some(description) = &image.description {
                    div {
                        h3 { "Image Prompt" }
                        p { (description) }
                    }
                }
                .overlay__stats {
                    span { strong { (image.likes) } " likes" }
                    span { strong { (image.views) } " views" }
                }
                p { "Uploaded on " (image.created_at.format("%B %-d, %Y")) }
                form method="post" action=(like_path(&image.id)) {
                    button.button.button--like type="submit" { "♥ Like this image" }
                }
                a.button href="/" { "Back to gallery" }
            }
        }
    })
}

pub fn upload_page(form: &UploadForm) -> Markup {
    layout("Upload Image", html! {
        form.form method="post" action="/upload" enctype="multipart/form-data" data-upload {
            h2 { "Upload Image" }
            p { "Share your precious moments with the community" }
            @if let Some(message) = form.failure() {
                .notice.notice--error { "Upload failed: " (message) }
            }

            label for="file" { "Image *" }
            .dropzone {
                p { "Drag and drop your image here, or" }
                input id="file" type="file" name="file" accept="image/*";
                p { small { "PNG, JPG, GIF up to 10MB" } }
            }

            label for="title" { "Title *" }
            input id="title" type="text" name="title" value=(form.title)
                placeholder="Enter a descriptive title for your image";

            label for="category" { "Category *" }
            select id="category" name="category" {
                option value="" selected[form.category.is_none()] { "Select a category" }
                @for category in Category::ALL {
                    option value=(category.slug()) selected[form.category == Some(category)] {
                        (category.label())
                    }
                }
            }

            label for="description" { "Description" }
            textarea id="description" name="description"
                placeholder="Tell us more about this image (optional)" { (form.description) }

            .form__actions {
                button.button.button--primary type="submit" disabled[!form.is_valid() || form.is_submitting()] {
                    @if form.is_submitting() { "Uploading..." } @else { "Upload Image" }
                }
                a.button href="/" { "Cancel" }
            }
        }
    })
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    layout(status.canonical_reason().unwrap_or("Error"), html! {
        .panel {
            h3 { (status.as_u16()) " " (status.canonical_reason().unwrap_or("")) }
            p { (message) }
            a.button href="/" { "Back to gallery" }
        }
    })
}
