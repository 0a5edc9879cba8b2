use std::str::FromStr;

use thiserror::Error;

use crate::model::{Category, ImageRecord, UnknownCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, image: &ImageRecord) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => image.category == category.slug(),
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(category) => category.slug(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(CategoryFilter::All),
            other => other.parse().map(CategoryFilter::Only),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Recent,
    Popular,
}

impl SortOrder {
    pub fn slug(self) -> &'static str {
        match self {
            SortOrder::Recent => "recent",
            SortOrder::Popular => "popular",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Recent => "Most Recent",
            SortOrder::Popular => "Most Popular",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order `{0}`")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "recent" => Ok(SortOrder::Recent),
            "popular" => Ok(SortOrder::Popular),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

pub fn filter_images(images: &[ImageRecord], filter: CategoryFilter) -> Vec<&ImageRecord> {
    images.iter().filter(|image| filter.matches(image)).collect()
}

/// Stable, so ties keep their input order.
pub fn sort_images(images: &mut [&ImageRecord], order: SortOrder) {
    match order {
        SortOrder::Recent => images.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Popular => images.sort_by(|a, b| b.likes.cmp(&a.likes)),
    }
}

pub fn browse(images: &[ImageRecord], filter: CategoryFilter, order: SortOrder) -> Vec<&ImageRecord> {
    let mut visible = filter_images(images, filter);
    sort_images(&mut visible, order);
    visible
}
