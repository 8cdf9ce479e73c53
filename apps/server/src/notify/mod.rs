//! Turns domain events into queued user notifications.
//!
//! Handlers implement [`NotificationHandler`]; the worker feeds every event
//! from the [`EventBus`](crate::events::EventBus) to each handler in turn.
//! Device delivery happens outside this service.

pub mod worker;

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::events::DomainEvent;
use crate::models::notification::{NOTIFY_GATHERING_CONFIRMED, NOTIFY_NEW_COMMITMENT};
use crate::services::NotificationService;

pub use worker::spawn;

/// Reacts to a domain event
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent) -> AppResult<()>;
}

/// Writes notifications to `notification_queue`
pub struct QueueHandler {
    pool: PgPool,
}

impl QueueHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationHandler for QueueHandler {
    async fn handle(&self, event: &DomainEvent) -> AppResult<()> {
        match event {
            DomainEvent::ProposalConfirmed {
                proposal_id,
                title,
                commitment_count,
            } => {
                let data = json!({
                    "proposal_id": proposal_id,
                    "title": title,
                    "commitment_count": commitment_count,
                });
                let queued = NotificationService::enqueue_for_committed(
                    &self.pool,
                    *proposal_id,
                    NOTIFY_GATHERING_CONFIRMED,
                    &data,
                )
                .await?;
                log::info!(
                    "Queued {} confirmation notifications for proposal {}",
                    queued,
                    proposal_id
                );
            }
            DomainEvent::CommitmentAdded {
                proposal_id,
                user_id,
                proposed_by,
                commitment_count,
            } if user_id != proposed_by => {
                let data = json!({
                    "proposal_id": proposal_id,
                    "user_id": user_id,
                    "commitment_count": commitment_count,
                });
                NotificationService::enqueue(&self.pool, *proposed_by, NOTIFY_NEW_COMMITMENT, &data)
                    .await?;
            }
            _ => {}
        }

        Ok(())
    }
}
