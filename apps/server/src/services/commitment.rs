//! Commitment tracking and quorum-based confirmation of proposals.
//!
//! A commit locks the proposal row for the rest of its transaction, so commits
//! to the same proposal are evaluated one at a time and the
//! `proposed -> confirmed` transition fires exactly once.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventBus};
use crate::models::{CommitOutcome, Commitment, CommittedUser, Proposal, ProposalStatus};
use crate::services::ProposalService;

pub struct CommitmentService;

/// Commit result plus the proposal it was recorded against
#[derive(Debug)]
pub(crate) struct CommitRecord {
    pub outcome: CommitOutcome,
    pub proposal: Proposal,
}

impl CommitmentService {
    /// Commits `user_id` to a proposal and confirms it if quorum is reached.
    ///
    /// Fails with `NotJoinable` when the proposal is missing or no longer
    /// `proposed`, and with `DuplicateCommitment` when the user already
    /// committed. Neither failure writes anything.
    pub async fn commit(
        pool: &PgPool,
        events: &EventBus,
        proposal_id: Uuid,
        user_id: i32,
        quorum: i64,
    ) -> AppResult<CommitOutcome> {
        let mut tx = pool.begin().await?;
        let record = Self::commit_in(&mut tx, proposal_id, user_id, quorum).await?;
        tx.commit().await?;

        Self::publish(events, &record, user_id);

        Ok(record.outcome)
    }

    /// Commit on an open transaction. The caller publishes events after committing.
    pub(crate) async fn commit_in(
        conn: &mut PgConnection,
        proposal_id: Uuid,
        user_id: i32,
        quorum: i64,
    ) -> AppResult<CommitRecord> {
        let proposal = ProposalService::lock(conn, proposal_id)
            .await?
            .ok_or_else(|| AppError::NotJoinable("proposal does not exist".to_string()))?;

        if !proposal.status.is_joinable() {
            return Err(AppError::NotJoinable(format!(
                "proposal is {}",
                proposal.status
            )));
        }

        let commitment = sqlx::query_as::<_, Commitment>(
            r#"
            INSERT INTO proposal_commitments (proposal_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (proposal_id, user_id) DO NOTHING
            RETURNING proposal_id, user_id, created_at
            "#,
        )
        .bind(proposal_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::DuplicateCommitment)?;

        let (commitment_count, status, newly_confirmed) =
            Self::apply_quorum(conn, &proposal, quorum).await?;

        log::info!(
            "User {} committed to proposal {} ({}/{})",
            user_id,
            proposal_id,
            commitment_count,
            quorum
        );

        Ok(CommitRecord {
            outcome: CommitOutcome {
                proposal_id,
                commitment_count,
                status,
                newly_confirmed,
                committed_at: commitment.created_at,
            },
            proposal,
        })
    }

    /// Re-evaluates quorum for a proposal and returns its resulting status.
    ///
    /// Idempotent: a confirmed, expired or cancelled proposal is left as is.
    pub async fn evaluate_quorum(
        pool: &PgPool,
        events: &EventBus,
        proposal_id: Uuid,
        quorum: i64,
    ) -> AppResult<ProposalStatus> {
        let mut tx = pool.begin().await?;
        let proposal = ProposalService::lock(&mut tx, proposal_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", proposal_id)))?;

        let (commitment_count, status, newly_confirmed) =
            Self::apply_quorum(&mut tx, &proposal, quorum).await?;
        tx.commit().await?;

        if newly_confirmed {
            events.publish(DomainEvent::ProposalConfirmed {
                proposal_id,
                title: proposal.title,
                commitment_count,
            });
        }

        Ok(status)
    }

    /// Lists committed users, earliest first
    pub async fn list(pool: &PgPool, proposal_id: Uuid) -> AppResult<Vec<CommittedUser>> {
        // Distinguish "no commitments" from "no proposal"
        ProposalService::get_by_id(pool, proposal_id).await?;

        let users = sqlx::query_as::<_, CommittedUser>(
            r#"
            SELECT c.user_id, u.first_name, c.created_at AS committed_at
            FROM proposal_commitments c
            JOIN users u ON u.id = c.user_id
            WHERE c.proposal_id = $1
            ORDER BY c.created_at ASC, c.user_id ASC
            "#,
        )
        .bind(proposal_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts distinct committed users
    pub async fn count(conn: &mut PgConnection, proposal_id: Uuid) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM proposal_commitments WHERE proposal_id = $1")
                .bind(proposal_id)
                .fetch_one(&mut *conn)
                .await?;
        Ok(count)
    }

    /// Confirms a locked proposal once its commitment count reaches quorum.
    /// Returns `(count, status, newly_confirmed)`.
    async fn apply_quorum(
        conn: &mut PgConnection,
        proposal: &Proposal,
        quorum: i64,
    ) -> AppResult<(i64, ProposalStatus, bool)> {
        let count = Self::count(conn, proposal.id).await?;
        let next = proposal.status.after_quorum_check(count, quorum);

        if next == proposal.status {
            return Ok((count, next, false));
        }

        let confirmed =
            ProposalService::transition_in(conn, proposal.id, ProposalStatus::Confirmed).await?;
        if confirmed {
            log::info!(
                "Proposal {} confirmed with {} commitments",
                proposal.id,
                count
            );
        }

        Ok((count, ProposalStatus::Confirmed, confirmed))
    }

    pub(crate) fn publish(events: &EventBus, record: &CommitRecord, user_id: i32) {
        events.publish(DomainEvent::CommitmentAdded {
            proposal_id: record.outcome.proposal_id,
            user_id,
            proposed_by: record.proposal.proposed_by,
            commitment_count: record.outcome.commitment_count,
        });

        if record.outcome.newly_confirmed {
            events.publish(DomainEvent::ProposalConfirmed {
                proposal_id: record.outcome.proposal_id,
                title: record.proposal.title.clone(),
                commitment_count: record.outcome.commitment_count,
            });
        }
    }
}
