use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Coordinates;

// =============================================================================
// Proposal Status
// =============================================================================

/// Lifecycle state of a gathering proposal.
///
/// `Proposed` is the only non-terminal state. It moves to `Confirmed` once
/// quorum is reached, or to `Expired` / `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Proposed,
    Confirmed,
    Expired,
    Cancelled,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Proposed => "proposed",
            ProposalStatus::Confirmed => "confirmed",
            ProposalStatus::Expired => "expired",
            ProposalStatus::Cancelled => "cancelled",
        }
    }

    /// Only proposals still gathering support accept commitments
    pub fn is_joinable(&self) -> bool {
        matches!(self, ProposalStatus::Proposed)
    }

    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        matches!(
            (self, next),
            (
                ProposalStatus::Proposed,
                ProposalStatus::Confirmed | ProposalStatus::Expired | ProposalStatus::Cancelled
            )
        )
    }

    /// Status after re-evaluating quorum against `commitment_count`
    pub fn after_quorum_check(&self, commitment_count: i64, quorum: i64) -> ProposalStatus {
        if *self == ProposalStatus::Proposed && commitment_count >= quorum {
            ProposalStatus::Confirmed
        } else {
            *self
        }
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Proposal
// =============================================================================

/// Proposal model for reading from the database
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Proposal {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub proposed_start_time: DateTime<Utc>,
    pub proposed_end_time: Option<DateTime<Utc>>,
    pub proposed_by: i32,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Proposal with its current commitment count, as shown on the gatherings board
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProposalSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub proposal: Proposal,
    pub commitment_count: i64,
}

/// DTO for creating a new proposal
#[derive(Debug, Deserialize)]
pub struct CreateProposal {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: Coordinates,
    pub proposed_start_time: DateTime<Utc>,
    #[serde(default)]
    pub proposed_end_time: Option<DateTime<Utc>>,
}

impl CreateProposal {
    /// Validates the input and returns the trimmed title
    pub fn validate(&self) -> AppResult<String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }
        if title.len() > 255 {
            return Err(AppError::Validation(
                "Title cannot exceed 255 characters".to_string(),
            ));
        }

        self.location.validate()?;

        if let Some(end) = self.proposed_end_time {
            if end < self.proposed_start_time {
                return Err(AppError::Validation(
                    "proposed_end_time cannot be before proposed_start_time".to_string(),
                ));
            }
        }

        Ok(title.to_string())
    }
}
