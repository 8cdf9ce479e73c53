use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::RateLimitConfig;
use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventBus};
use crate::models::{CreatePin, Pin, PinCreatedResponse, ACTION_CREATE_PIN};
use crate::pagination;
use crate::services::RateLimitService;

pub struct PinService;

impl PinService {
    /// Drops a new pin, charging one unit of the user's `create_pin` quota.
    ///
    /// The quota update and the insert share a transaction: a rejected or
    /// failed insert leaves the counter untouched.
    pub async fn create(
        pool: &PgPool,
        events: &EventBus,
        user_id: i32,
        input: CreatePin,
        limits: &RateLimitConfig,
    ) -> AppResult<PinCreatedResponse> {
        let now = Utc::now();
        let (title, tags) = input.validate(now)?;
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let mut tx = pool.begin().await?;

        let decision = RateLimitService::consume_in(
            &mut tx,
            user_id,
            ACTION_CREATE_PIN,
            limits.max_pins_per_window,
            limits.pin_window,
            now,
        )
        .await?;

        if !decision.allowed {
            tx.rollback().await?;
            return Err(AppError::RateLimitExceeded {
                action_type: ACTION_CREATE_PIN.to_string(),
                retry_after: decision.retry_after(now),
            });
        }

        let pin = sqlx::query_as::<_, Pin>(
            r#"
            INSERT INTO locations
                (pin_type, title, description, latitude, longitude, tags, active_until, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, pin_type, title, description, latitude, longitude,
                      tags, active_until, created_by, created_at
            "#,
        )
        .bind(input.pin_type)
        .bind(&title)
        .bind(description)
        .bind(input.location.latitude)
        .bind(input.location.longitude)
        .bind(&tags)
        .bind(input.active_until)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "User {} dropped pin {} ({} left this window)",
            user_id,
            pin.id,
            decision.remaining
        );

        events.publish(DomainEvent::PinCreated {
            pin_id: pin.id,
            created_by: user_id,
        });

        Ok(PinCreatedResponse {
            pin,
            rate_limit: decision,
        })
    }

    /// Gets a pin by ID
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> AppResult<Pin> {
        sqlx::query_as::<_, Pin>(
            r#"
            SELECT id, pin_type, title, description, latitude, longitude,
                   tags, active_until, created_by, created_at
            FROM locations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pin {} not found", id)))
    }

    /// Lists pins that have not expired, newest first
    pub async fn list_active(
        pool: &PgPool,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<Pin>, i64)> {
        let offset = pagination::offset(page, per_page);

        let total_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM locations WHERE active_until IS NULL OR active_until > NOW()",
        )
        .fetch_one(pool)
        .await?;

        let pins = sqlx::query_as::<_, Pin>(
            r#"
            SELECT id, pin_type, title, description, latitude, longitude,
                   tags, active_until, created_by, created_at
            FROM locations
            WHERE active_until IS NULL OR active_until > NOW()
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok((pins, total_count))
    }
}
