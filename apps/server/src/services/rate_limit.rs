use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::{RateLimitCounter, RateLimitDecision};

pub struct RateLimitService;

impl RateLimitService {
    /// Checks the caller's quota for `action_type` and consumes one unit if allowed.
    ///
    /// Runs in its own transaction. Use [`RateLimitService::consume_in`] when the
    /// guarded action must share a transaction with the counter update.
    pub async fn check_and_consume(
        pool: &PgPool,
        user_id: i32,
        action_type: &str,
        max_count: i32,
        window: Duration,
    ) -> AppResult<RateLimitDecision> {
        let mut tx = pool.begin().await?;
        let decision =
            Self::consume_in(&mut tx, user_id, action_type, max_count, window, Utc::now()).await?;
        tx.commit().await?;

        Ok(decision)
    }

    /// Check-and-consume on an open connection or transaction.
    ///
    /// The counter row is created if missing and then locked with `FOR UPDATE`,
    /// so concurrent calls for the same (user, action) serialize and can never
    /// push `count` past `max_count`.
    pub async fn consume_in(
        conn: &mut PgConnection,
        user_id: i32,
        action_type: &str,
        max_count: i32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<RateLimitDecision> {
        if action_type.trim().is_empty() {
            return Err(AppError::Validation(
                "action_type cannot be empty".to_string(),
            ));
        }
        if max_count <= 0 {
            return Err(AppError::Validation(
                "max_count must be greater than zero".to_string(),
            ));
        }
        let window = chrono::Duration::from_std(window)
            .ok()
            .filter(|w| *w > chrono::Duration::zero())
            .ok_or_else(|| {
                AppError::Validation("window must be greater than zero".to_string())
            })?;

        sqlx::query(
            r#"
            INSERT INTO rate_limits (user_id, action_type, window_start, count)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (user_id, action_type) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(action_type)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let current: (DateTime<Utc>, i32) = sqlx::query_as(
            r#"
            SELECT window_start, count
            FROM rate_limits
            WHERE user_id = $1 AND action_type = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(action_type)
        .fetch_one(&mut *conn)
        .await?;

        let decision = RateLimitDecision::evaluate(Some(current), now, max_count, window);

        if decision.allowed {
            sqlx::query(
                r#"
                UPDATE rate_limits
                SET window_start = $3, count = $4
                WHERE user_id = $1 AND action_type = $2
                "#,
            )
            .bind(user_id)
            .bind(action_type)
            .bind(decision.window_start)
            .bind(decision.count)
            .execute(&mut *conn)
            .await?;
        } else {
            log::warn!(
                "Rate limit reached for user {} on {} ({}/{}), resets at {}",
                user_id,
                action_type,
                decision.count,
                max_count,
                decision.reset_at
            );
        }

        Ok(decision)
    }

    /// Reads the stored counter without touching it
    pub async fn get_counter(
        pool: &PgPool,
        user_id: i32,
        action_type: &str,
    ) -> AppResult<Option<RateLimitCounter>> {
        let counter = sqlx::query_as::<_, RateLimitCounter>(
            r#"
            SELECT user_id, action_type, window_start, count
            FROM rate_limits
            WHERE user_id = $1 AND action_type = $2
            "#,
        )
        .bind(user_id)
        .bind(action_type)
        .fetch_optional(pool)
        .await?;

        Ok(counter)
    }
}
