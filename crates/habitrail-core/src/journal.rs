//! One journal entry per calendar day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date_key::DateKey;
use crate::error::ValidationError;

pub const DEFAULT_RATING: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: DateKey,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Day rating, 1 (bad) to 5 (great).
    #[serde(default = "default_rating")]
    pub rating: u8,
    pub updated_at: DateTime<Utc>,
}

fn default_rating() -> u8 {
    DEFAULT_RATING
}

impl JournalEntry {
    /// # Errors
    /// Returns a validation error if `rating` is outside 1..=5.
    pub fn new(
        date: DateKey,
        title: impl Into<String>,
        text: impl Into<String>,
        rating: u8,
    ) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::InvalidValue {
                field: "rating".to_string(),
                message: format!("rating must be between 1 and 5, got {rating}"),
            });
        }
        Ok(Self {
            date,
            title: title.into(),
            text: text.into(),
            rating,
            updated_at: Utc::now(),
        })
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.text.trim().is_empty()
    }
}
