use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const MAX_COMMENT_LEN: usize = 2000;

/// A message on a pin's board, with its author's name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PinComment {
    pub id: i64,
    pub pin_id: Uuid,
    pub user_id: i32,
    pub author_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePinComment {
    pub content: String,
}

impl CreatePinComment {
    /// Returns the trimmed content
    pub fn validate(&self) -> AppResult<String> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        if content.chars().count() > MAX_COMMENT_LEN {
            return Err(AppError::Validation(format!(
                "Comment cannot exceed {} characters",
                MAX_COMMENT_LEN
            )));
        }
        Ok(content.to_string())
    }
}
