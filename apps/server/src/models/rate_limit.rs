use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Action tag used for pin creation
pub const ACTION_CREATE_PIN: &str = "create_pin";

/// Persisted per-user counter for one action type
#[derive(Debug, Clone, FromRow)]
pub struct RateLimitCounter {
    pub user_id: i32,
    pub action_type: String,
    pub window_start: DateTime<Utc>,
    pub count: i32,
}

/// Outcome of a check-and-consume call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// `max(0, max_count - count)` after the decision
    pub remaining: i32,
    /// When the current window closes
    pub reset_at: DateTime<Utc>,
    #[serde(skip)]
    pub count: i32,
    #[serde(skip)]
    pub window_start: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Decides whether one more action fits in the window.
    ///
    /// `current` is the stored `(window_start, count)`, if any. A window that
    /// started `window` or more before `now` is treated as absent. A denied
    /// decision never bumps the count.
    pub fn evaluate(
        current: Option<(DateTime<Utc>, i32)>,
        now: DateTime<Utc>,
        max_count: i32,
        window: Duration,
    ) -> Self {
        let active = current.filter(|(start, _)| now < *start + window);

        let (allowed, window_start, count) = match active {
            None => (true, now, 1),
            Some((start, count)) if count < max_count => (true, start, count + 1),
            Some((start, count)) => (false, start, count),
        };

        Self {
            allowed,
            remaining: (max_count - count).max(0),
            reset_at: window_start + window,
            count,
            window_start,
        }
    }

    /// Seconds until the window resets, never less than one
    pub fn retry_after(&self, now: DateTime<Utc>) -> u64 {
        (self.reset_at - now).num_seconds().max(1) as u64
    }
}
