use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Notification;

pub struct NotificationService;

impl NotificationService {
    /// Queues one notification for a user
    pub async fn enqueue(
        pool: &PgPool,
        user_id: i32,
        notification_type: &str,
        data: &serde_json::Value,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_queue (user_id, notification_type, data)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(data)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Queues the same notification for every user committed to a proposal.
    /// Returns how many were queued.
    pub async fn enqueue_for_committed(
        pool: &PgPool,
        proposal_id: Uuid,
        notification_type: &str,
        data: &serde_json::Value,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification_queue (user_id, notification_type, data)
            SELECT user_id, $2, $3
            FROM proposal_commitments
            WHERE proposal_id = $1
            "#,
        )
        .bind(proposal_id)
        .bind(notification_type)
        .bind(data)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists a user's most recent notifications
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i32,
        limit: i64,
    ) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, notification_type, data, created_at, sent_at
            FROM notification_queue
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }
}
