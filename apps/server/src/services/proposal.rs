use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventBus};
use crate::models::{CreateProposal, Proposal, ProposalStatus, ProposalSummary};
use crate::pagination::{self, SortOrder};
use crate::services::CommitmentService;

const PROPOSAL_COLUMNS: &str = r#"
    p.id, p.title, p.description, p.latitude, p.longitude,
    p.proposed_start_time, p.proposed_end_time, p.proposed_by,
    p.status, p.created_at, p.updated_at
"#;

pub struct ProposalService;

impl ProposalService {
    /// Creates a proposal and commits its creator to it
    pub async fn create(
        pool: &PgPool,
        events: &EventBus,
        user_id: i32,
        input: CreateProposal,
        quorum: i64,
    ) -> AppResult<ProposalSummary> {
        let title = input.validate()?;
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let mut tx = pool.begin().await?;

        let proposal_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO meeting_proposals
                (title, description, latitude, longitude,
                 proposed_start_time, proposed_end_time, proposed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(description)
        .bind(input.location.latitude)
        .bind(input.location.longitude)
        .bind(input.proposed_start_time)
        .bind(input.proposed_end_time)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let record = CommitmentService::commit_in(&mut tx, proposal_id, user_id, quorum).await?;

        tx.commit().await?;

        log::info!("User {} proposed gathering {} ({})", user_id, proposal_id, title);

        events.publish(DomainEvent::ProposalCreated {
            proposal_id,
            proposed_by: user_id,
        });
        CommitmentService::publish(events, &record, user_id);

        Self::get_by_id(pool, proposal_id).await
    }

    /// Gets a proposal with its commitment count
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> AppResult<ProposalSummary> {
        let query = format!(
            r#"
            SELECT {PROPOSAL_COLUMNS},
                   (SELECT COUNT(*) FROM proposal_commitments c WHERE c.proposal_id = p.id)
                       AS commitment_count
            FROM meeting_proposals p
            WHERE p.id = $1
            "#
        );

        sqlx::query_as::<_, ProposalSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", id)))
    }

    /// Lists proposals in one status with offset-based pagination
    pub async fn list_offset(
        pool: &PgPool,
        status: ProposalStatus,
        order: SortOrder,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<ProposalSummary>, i64)> {
        let offset = pagination::offset(page, per_page);

        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM meeting_proposals WHERE status = $1")
                .bind(status)
                .fetch_one(pool)
                .await?;

        let order_clause = match order {
            SortOrder::Asc => "ORDER BY p.created_at ASC",
            SortOrder::Desc => "ORDER BY p.created_at DESC",
        };

        let query = format!(
            r#"
            SELECT {PROPOSAL_COLUMNS},
                   COUNT(c.user_id) AS commitment_count
            FROM meeting_proposals p
            LEFT JOIN proposal_commitments c ON c.proposal_id = p.id
            WHERE p.status = $1
            GROUP BY p.id
            {order_clause}
            LIMIT $2 OFFSET $3
            "#
        );

        let proposals = sqlx::query_as::<_, ProposalSummary>(&query)
            .bind(status)
            .bind(per_page)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok((proposals, total_count))
    }

    /// Cancels a proposal. Only its proposer may cancel, and only while proposed.
    pub async fn cancel(
        pool: &PgPool,
        events: &EventBus,
        id: Uuid,
        user_id: i32,
    ) -> AppResult<ProposalSummary> {
        let mut tx = pool.begin().await?;
        let proposal = Self::lock(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", id)))?;

        if proposal.proposed_by != user_id {
            return Err(AppError::Forbidden(
                "Only the proposer can cancel a proposal".to_string(),
            ));
        }

        Self::close_locked(&mut tx, &proposal, ProposalStatus::Cancelled).await?;
        tx.commit().await?;

        events.publish(DomainEvent::ProposalClosed {
            proposal_id: id,
            status: ProposalStatus::Cancelled,
        });

        Self::get_by_id(pool, id).await
    }

    /// Marks a proposal expired. No trigger calls this automatically.
    pub async fn expire(pool: &PgPool, events: &EventBus, id: Uuid) -> AppResult<ProposalSummary> {
        let mut tx = pool.begin().await?;
        let proposal = Self::lock(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", id)))?;

        Self::close_locked(&mut tx, &proposal, ProposalStatus::Expired).await?;
        tx.commit().await?;

        events.publish(DomainEvent::ProposalClosed {
            proposal_id: id,
            status: ProposalStatus::Expired,
        });

        Self::get_by_id(pool, id).await
    }

    /// Loads a proposal and locks its row until the transaction ends
    pub(crate) async fn lock(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Proposal>> {
        let proposal = sqlx::query_as::<_, Proposal>(
            r#"
            SELECT id, title, description, latitude, longitude,
                   proposed_start_time, proposed_end_time, proposed_by,
                   status, created_at, updated_at
            FROM meeting_proposals
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(proposal)
    }

    /// Moves a `proposed` row to `next`. Returns false if the row was no longer
    /// `proposed`, in which case nothing changed.
    pub(crate) async fn transition_in(
        conn: &mut PgConnection,
        id: Uuid,
        next: ProposalStatus,
    ) -> AppResult<bool> {
        if !ProposalStatus::Proposed.can_transition_to(next) {
            return Err(AppError::Internal(format!(
                "Invalid proposal transition to {}",
                next
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE meeting_proposals
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'proposed'
            "#,
        )
        .bind(id)
        .bind(next)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn close_locked(
        conn: &mut PgConnection,
        proposal: &Proposal,
        next: ProposalStatus,
    ) -> AppResult<()> {
        if !proposal.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Proposal is already {}",
                proposal.status
            )));
        }

        Self::transition_in(conn, proposal.id, next).await?;
        log::info!("Proposal {} is now {}", proposal.id, next);

        Ok(())
    }
}
