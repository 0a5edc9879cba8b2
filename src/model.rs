use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One image as held by the backend. Field names match the `images` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn counter(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Likes => self.likes,
            Counter::Views => self.views,
        }
    }

    pub fn set_counter(&mut self, counter: Counter, value: u64) {
        match counter {
            Counter::Likes => self.likes = value,
            Counter::Views => self.views = value,
        }
    }

    pub fn style(&self) -> CategoryStyle {
        CategoryStyle::for_slug(&self.category)
    }
}

/// Insert payload. The backend fills in id, timestamp and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewImage {
    pub title: String,
    pub category: String,
    pub image_url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Views,
}

impl Counter {
    pub fn column(self) -> &'static str {
        match self {
            Counter::Likes => "likes",
            Counter::Views => "views",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Weddings,
    Birthdays,
    Couples,
    Kids,
    Babies,
    PreWedding,
    Female,
    Male,
    Others,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Weddings,
        Category::Birthdays,
        Category::Couples,
        Category::Kids,
        Category::Babies,
        Category::PreWedding,
        Category::Female,
        Category::Male,
        Category::Others,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::Weddings => "weddings",
            Category::Birthdays => "birthdays",
            Category::Couples => "couples",
            Category::Kids => "kids",
            Category::Babies => "babies",
            Category::PreWedding => "pre-wedding",
            Category::Female => "female",
            Category::Male => "male",
            Category::Others => "others",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Weddings => "Weddings",
            Category::Birthdays => "Birthdays",
            Category::Couples => "Couples",
            Category::Kids => "Kids",
            Category::Babies => "Babies",
            Category::PreWedding => "Pre-Wedding",
            Category::Female => "Female",
            Category::Male => "Male",
            Category::Others => "Others",
        }
    }

    pub fn style(self) -> CategoryStyle {
        match self {
            Category::Weddings | Category::Female => CategoryStyle::Pink,
            Category::Birthdays => CategoryStyle::Yellow,
            Category::Couples => CategoryStyle::Red,
            Category::Kids | Category::Male => CategoryStyle::Blue,
            Category::Babies => CategoryStyle::Green,
            Category::PreWedding => CategoryStyle::Purple,
            Category::Others => CategoryStyle::Gray,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.slug() == trimmed)
            .ok_or_else(|| UnknownCategory(trimmed.to_string()))
    }
}

/// Badge colour for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStyle {
    Pink,
    Yellow,
    Red,
    Blue,
    Green,
    Purple,
    Gray,
}

impl CategoryStyle {
    /// Stored categories are free text; anything unrecognised gets the
    /// `others` bucket.
    pub fn for_slug(slug: &str) -> Self {
        match slug.parse::<Category>() {
            Ok(category) => category.style(),
            Err(_) => Category::Others.style(),
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            CategoryStyle::Pink => "badge--pink",
            CategoryStyle::Yellow => "badge--yellow",
            CategoryStyle::Red => "badge--red",
            CategoryStyle::Blue => "badge--blue",
            CategoryStyle::Green => "badge--green",
            CategoryStyle::Purple => "badge--purple",
            CategoryStyle::Gray => "badge--gray",
        }
    }
}
