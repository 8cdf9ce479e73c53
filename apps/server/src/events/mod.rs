//! In-process domain event bus.
//!
//! Services publish an event after their transaction commits. Subscribers
//! (the notification worker, tests) receive every event published after they
//! subscribed. Publishing never blocks and never fails the caller.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::ProposalStatus;

/// Default number of buffered events per subscriber
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    ProposalCreated {
        proposal_id: Uuid,
        proposed_by: i32,
    },
    CommitmentAdded {
        proposal_id: Uuid,
        user_id: i32,
        proposed_by: i32,
        commitment_count: i64,
    },
    ProposalConfirmed {
        proposal_id: Uuid,
        title: String,
        commitment_count: i64,
    },
    ProposalClosed {
        proposal_id: Uuid,
        status: ProposalStatus,
    },
    PinCreated {
        pin_id: Uuid,
        created_by: i32,
    },
}

/// Cloneable handle to the broadcast channel
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all current subscribers
    pub fn publish(&self, event: DomainEvent) {
        log::debug!("Publishing {:?}", event);
        // No subscribers is fine (e.g. tests without a worker)
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
