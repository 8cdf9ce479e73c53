use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::ProposalStatus;

/// A user's pledge to attend a proposal. Unique per (proposal_id, user_id).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Commitment {
    pub proposal_id: Uuid,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Committed user as listed under a proposal
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommittedUser {
    pub user_id: i32,
    pub first_name: Option<String>,
    pub committed_at: DateTime<Utc>,
}

/// Result of a successful commit
#[derive(Debug, Clone, Serialize)]
pub struct CommitOutcome {
    pub proposal_id: Uuid,
    pub commitment_count: i64,
    pub status: ProposalStatus,
    /// True only for the commit that moved the proposal to confirmed
    pub newly_confirmed: bool,
    pub committed_at: DateTime<Utc>,
}
