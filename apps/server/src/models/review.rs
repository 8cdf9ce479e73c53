use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Lowest rating shown to other users
pub const MIN_VISIBLE_RATING: i16 = 4;
pub const MAX_REVIEW_LEN: usize = 2000;

/// A user's safety review of a pinned location. One per reviewer per pin.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SafetyReview {
    pub id: Uuid,
    pub location_id: Uuid,
    pub reviewer_id: i32,
    pub reviewer_name: Option<String>,
    pub rating: i16,
    pub felt_safe: bool,
    pub visible: bool,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// DTO for reviewing a pin
#[derive(Debug, Deserialize)]
pub struct CreateSafetyReview {
    pub rating: i16,
    #[serde(default = "default_felt_safe")]
    pub felt_safe: bool,
    #[serde(default)]
    pub review_text: Option<String>,
}

fn default_felt_safe() -> bool {
    true
}

impl CreateSafetyReview {
    /// Checks the rating and returns the trimmed review text, if any
    pub fn validate(&self) -> AppResult<Option<String>> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let text = self
            .review_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if text.is_some_and(|t| t.chars().count() > MAX_REVIEW_LEN) {
            return Err(AppError::Validation(format!(
                "Review cannot exceed {} characters",
                MAX_REVIEW_LEN
            )));
        }

        Ok(text.map(str::to_string))
    }

    /// Only 4 and 5 star reviews are shown publicly
    pub fn is_visible(&self) -> bool {
        self.rating >= MIN_VISIBLE_RATING
    }
}
