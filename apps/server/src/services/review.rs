use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CreateSafetyReview, SafetyReview};
use crate::services::PinService;

pub struct ReviewService;

impl ReviewService {
    /// Records a safety review. Reviews under 4 stars are stored hidden.
    pub async fn create(
        pool: &PgPool,
        pin_id: Uuid,
        reviewer_id: i32,
        input: CreateSafetyReview,
    ) -> AppResult<SafetyReview> {
        let review_text = input.validate()?;
        PinService::get_by_id(pool, pin_id).await?;

        let review = sqlx::query_as::<_, SafetyReview>(
            r#"
            WITH inserted AS (
                INSERT INTO safety_reviews
                    (location_id, reviewer_id, rating, felt_safe, visible, review_text)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, location_id, reviewer_id, rating, felt_safe, visible,
                          review_text, created_at
            )
            SELECT r.id, r.location_id, r.reviewer_id, u.first_name AS reviewer_name,
                   r.rating, r.felt_safe, r.visible, r.review_text, r.created_at
            FROM inserted r
            JOIN users u ON u.id = r.reviewer_id
            "#,
        )
        .bind(pin_id)
        .bind(reviewer_id)
        .bind(input.rating)
        .bind(input.felt_safe)
        .bind(input.is_visible())
        .bind(review_text)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("You have already reviewed this pin".to_string())
            }
            e => AppError::Database(e),
        })?;

        log::info!(
            "User {} reviewed pin {} ({} stars, visible: {})",
            reviewer_id,
            pin_id,
            review.rating,
            review.visible
        );

        Ok(review)
    }

    /// Lists a pin's publicly visible reviews, newest first
    pub async fn list_visible(pool: &PgPool, pin_id: Uuid) -> AppResult<Vec<SafetyReview>> {
        PinService::get_by_id(pool, pin_id).await?;

        let reviews = sqlx::query_as::<_, SafetyReview>(
            r#"
            SELECT r.id, r.location_id, r.reviewer_id, u.first_name AS reviewer_name,
                   r.rating, r.felt_safe, r.visible, r.review_text, r.created_at
            FROM safety_reviews r
            JOIN users u ON u.id = r.reviewer_id
            WHERE r.location_id = $1 AND r.visible
            ORDER BY r.created_at DESC, r.id
            "#,
        )
        .bind(pin_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }
}
