use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const NOTIFY_GATHERING_CONFIRMED: &str = "gathering_confirmed";
pub const NOTIFY_NEW_COMMITMENT: &str = "new_commitment";

/// Queued notification awaiting delivery by the push service
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i32,
    pub notification_type: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}
