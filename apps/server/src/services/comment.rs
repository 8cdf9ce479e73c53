use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{CreatePinComment, PinComment};
use crate::services::PinService;

pub struct CommentService;

impl CommentService {
    /// Posts a message on a pin's board
    pub async fn create(
        pool: &PgPool,
        pin_id: Uuid,
        user_id: i32,
        input: CreatePinComment,
    ) -> AppResult<PinComment> {
        let content = input.validate()?;
        PinService::get_by_id(pool, pin_id).await?;

        let comment = sqlx::query_as::<_, PinComment>(
            r#"
            WITH inserted AS (
                INSERT INTO pin_comments (pin_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, pin_id, user_id, content, created_at
            )
            SELECT c.id, c.pin_id, c.user_id, u.first_name AS author_name,
                   c.content, c.created_at
            FROM inserted c
            JOIN users u ON u.id = c.user_id
            "#,
        )
        .bind(pin_id)
        .bind(user_id)
        .bind(&content)
        .fetch_one(pool)
        .await?;

        log::debug!("User {} commented on pin {}", user_id, pin_id);

        Ok(comment)
    }

    /// Lists a pin's board, oldest first
    pub async fn list(pool: &PgPool, pin_id: Uuid) -> AppResult<Vec<PinComment>> {
        PinService::get_by_id(pool, pin_id).await?;

        let comments = sqlx::query_as::<_, PinComment>(
            r#"
            SELECT c.id, c.pin_id, c.user_id, u.first_name AS author_name,
                   c.content, c.created_at
            FROM pin_comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.pin_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(pin_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }
}
