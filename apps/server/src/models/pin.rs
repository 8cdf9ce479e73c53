use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Coordinates, RateLimitDecision};

pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LEN: usize = 32;

/// Kind of place a pin marks on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PinType {
    OpenCamp,
    Gathering,
    QuietPlace,
    Resource,
}

/// Pin (location) model for reading from the database
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Pin {
    pub id: Uuid,
    pub pin_type: PinType,
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub tags: Vec<String>,
    pub active_until: Option<DateTime<Utc>>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

/// DTO for dropping a new pin
#[derive(Debug, Deserialize)]
pub struct CreatePin {
    pub pin_type: PinType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: Coordinates,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub active_until: Option<DateTime<Utc>>,
}

/// Response for a created pin, with what is left of the caller's quota
#[derive(Debug, Serialize)]
pub struct PinCreatedResponse {
    pub pin: Pin,
    pub rate_limit: RateLimitDecision,
}

impl CreatePin {
    /// Validates the input, returning the trimmed title and normalized tags
    pub fn validate(&self, now: DateTime<Utc>) -> AppResult<(String, Vec<String>)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }
        if title.len() > 255 {
            return Err(AppError::Validation(
                "Title cannot exceed 255 characters".to_string(),
            ));
        }

        self.location.validate()?;

        if let Some(until) = self.active_until {
            if until <= now {
                return Err(AppError::Validation(
                    "active_until must be in the future".to_string(),
                ));
            }
        }

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = tag.trim().to_lowercase();
            if tag.is_empty() {
                continue;
            }
            if tag.len() > MAX_TAG_LEN {
                return Err(AppError::Validation(format!(
                    "Tags cannot exceed {} characters",
                    MAX_TAG_LEN
                )));
            }
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if tags.len() > MAX_TAGS {
            return Err(AppError::Validation(format!(
                "A pin can have at most {} tags",
                MAX_TAGS
            )));
        }

        Ok((title.to_string(), tags))
    }
}
