//! Integration tests for the commitment tracker
//!
//! Quorum confirmation, duplicate and non-joinable commits, ordering of
//! committed users and the events published along the way.

use pretty_assertions::assert_eq;
use tokio::sync::broadcast::error::TryRecvError;
use uuid::Uuid;
use wildchurch::error::AppError;
use wildchurch::events::{DomainEvent, EventBus};
use wildchurch::models::ProposalStatus;
use wildchurch::services::{CommitmentService, ProposalService};

use crate::common::{
    create_test_proposal, create_test_user, insert_bare_proposal, stored_commitments,
    stored_status, TestDb,
};

const QUORUM: i64 = 4;

// =============================================================================
// Quorum
// =============================================================================

#[actix_web::test]
async fn test_fourth_commitment_confirms_proposal() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let proposal_id = insert_bare_proposal(&db.pool, &proposer).await;

    let mut users = Vec::new();
    for name in ["Ada", "Bea", "Cy", "Dot"] {
        users.push(create_test_user(&db.pool, name).await);
    }

    for (i, user) in users.iter().take(3).enumerate() {
        let outcome = CommitmentService::commit(&db.pool, &events, proposal_id, user.id, QUORUM)
            .await
            .expect("commit should succeed");

        assert_eq!(outcome.commitment_count, i as i64 + 1);
        assert_eq!(outcome.status, ProposalStatus::Proposed);
        assert!(!outcome.newly_confirmed);
    }
    assert_eq!(stored_status(&db.pool, proposal_id).await, "proposed");

    let outcome = CommitmentService::commit(&db.pool, &events, proposal_id, users[3].id, QUORUM)
        .await
        .expect("fourth commit should succeed");

    assert_eq!(outcome.commitment_count, 4);
    assert_eq!(outcome.status, ProposalStatus::Confirmed);
    assert!(outcome.newly_confirmed);
    assert_eq!(stored_status(&db.pool, proposal_id).await, "confirmed");
}

#[actix_web::test]
async fn test_quorum_is_configurable() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let other = create_test_user(&db.pool, "Other").await;

    // Proposer's automatic commitment is the first of two
    let proposal = create_test_proposal(&db.pool, &events, &proposer, 2).await;
    assert_eq!(proposal.commitment_count, 1);
    assert_eq!(proposal.proposal.status, ProposalStatus::Proposed);

    let outcome = CommitmentService::commit(&db.pool, &events, proposal.proposal.id, other.id, 2)
        .await
        .unwrap();
    assert_eq!(outcome.status, ProposalStatus::Confirmed);
}

#[actix_web::test]
async fn test_quorum_of_one_confirms_on_creation() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Solo").await;

    let proposal = create_test_proposal(&db.pool, &events, &proposer, 1).await;

    assert_eq!(proposal.commitment_count, 1);
    assert_eq!(proposal.proposal.status, ProposalStatus::Confirmed);
}

#[actix_web::test]
async fn test_evaluate_quorum_is_idempotent() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let a = create_test_user(&db.pool, "Ada").await;
    let b = create_test_user(&db.pool, "Bea").await;
    let proposal_id = insert_bare_proposal(&db.pool, &proposer).await;

    // Rows written behind the tracker's back, as an import would
    for user in [&a, &b] {
        sqlx::query("INSERT INTO proposal_commitments (proposal_id, user_id) VALUES ($1, $2)")
            .bind(proposal_id)
            .bind(user.id)
            .execute(&db.pool)
            .await
            .unwrap();
    }

    let status = CommitmentService::evaluate_quorum(&db.pool, &events, proposal_id, 3)
        .await
        .unwrap();
    assert_eq!(status, ProposalStatus::Proposed);

    let status = CommitmentService::evaluate_quorum(&db.pool, &events, proposal_id, 2)
        .await
        .unwrap();
    assert_eq!(status, ProposalStatus::Confirmed);

    // Second evaluation changes nothing and does not error
    let status = CommitmentService::evaluate_quorum(&db.pool, &events, proposal_id, 2)
        .await
        .unwrap();
    assert_eq!(status, ProposalStatus::Confirmed);
    assert_eq!(stored_status(&db.pool, proposal_id).await, "confirmed");

    // Exactly one confirmation event
    let event = rx.try_recv().unwrap();
    assert!(matches!(event, DomainEvent::ProposalConfirmed { commitment_count: 2, .. }));
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[actix_web::test]
async fn test_evaluate_quorum_unknown_proposal() {
    let db = TestDb::new().await;
    let events = EventBus::default();

    let result =
        CommitmentService::evaluate_quorum(&db.pool, &events, Uuid::new_v4(), QUORUM).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// =============================================================================
// Duplicate and non-joinable commits
// =============================================================================

#[actix_web::test]
async fn test_duplicate_commit_rejected_without_side_effect() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let user = create_test_user(&db.pool, "Ada").await;
    let proposal_id = insert_bare_proposal(&db.pool, &proposer).await;

    CommitmentService::commit(&db.pool, &events, proposal_id, user.id, QUORUM)
        .await
        .unwrap();
    let before = stored_commitments(&db.pool, proposal_id).await;

    let result = CommitmentService::commit(&db.pool, &events, proposal_id, user.id, QUORUM).await;

    assert!(matches!(result, Err(AppError::DuplicateCommitment)));
    assert_eq!(stored_commitments(&db.pool, proposal_id).await, before);
    assert_eq!(before, 1);
}

#[actix_web::test]
async fn test_proposer_cannot_commit_twice() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let proposal = create_test_proposal(&db.pool, &events, &proposer, QUORUM).await;

    let result =
        CommitmentService::commit(&db.pool, &events, proposal.proposal.id, proposer.id, QUORUM)
            .await;
    assert!(matches!(result, Err(AppError::DuplicateCommitment)));
}

#[actix_web::test]
async fn test_commit_to_confirmed_proposal_not_joinable() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let late = create_test_user(&db.pool, "Late").await;
    let proposal = create_test_proposal(&db.pool, &events, &proposer, 1).await;
    assert_eq!(proposal.proposal.status, ProposalStatus::Confirmed);

    let result =
        CommitmentService::commit(&db.pool, &events, proposal.proposal.id, late.id, 1).await;

    assert!(matches!(result, Err(AppError::NotJoinable(_))));
    assert_eq!(stored_commitments(&db.pool, proposal.proposal.id).await, 1);
}

#[actix_web::test]
async fn test_commit_to_expired_proposal_not_joinable() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let user = create_test_user(&db.pool, "Ada").await;
    let proposal_id = insert_bare_proposal(&db.pool, &proposer).await;

    ProposalService::expire(&db.pool, &events, proposal_id)
        .await
        .unwrap();

    let result = CommitmentService::commit(&db.pool, &events, proposal_id, user.id, QUORUM).await;

    assert!(matches!(result, Err(AppError::NotJoinable(_))));
    assert_eq!(stored_commitments(&db.pool, proposal_id).await, 0);
}

#[actix_web::test]
async fn test_commit_to_missing_proposal_not_joinable() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let user = create_test_user(&db.pool, "Ada").await;

    let result =
        CommitmentService::commit(&db.pool, &events, Uuid::new_v4(), user.id, QUORUM).await;
    assert!(matches!(result, Err(AppError::NotJoinable(_))));
}

// =============================================================================
// Listing and events
// =============================================================================

#[actix_web::test]
async fn test_list_commitments_in_commit_order() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let proposal_id = insert_bare_proposal(&db.pool, &proposer).await;

    let mut expected = Vec::new();
    for name in ["Cy", "Ada", "Bea"] {
        let user = create_test_user(&db.pool, name).await;
        CommitmentService::commit(&db.pool, &events, proposal_id, user.id, QUORUM)
            .await
            .unwrap();
        expected.push((user.id, Some(name.to_string())));
    }

    let listed: Vec<_> = CommitmentService::list(&db.pool, proposal_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| (c.user_id, c.first_name))
        .collect();

    assert_eq!(listed, expected);
}

#[actix_web::test]
async fn test_list_commitments_unknown_proposal() {
    let db = TestDb::new().await;

    let result = CommitmentService::list(&db.pool, Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_web::test]
async fn test_commit_publishes_events() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let joiner = create_test_user(&db.pool, "Joiner").await;
    let proposal = create_test_proposal(&db.pool, &events, &proposer, 2).await;
    let proposal_id = proposal.proposal.id;

    let mut rx = events.subscribe();
    CommitmentService::commit(&db.pool, &events, proposal_id, joiner.id, 2)
        .await
        .unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        DomainEvent::CommitmentAdded {
            proposal_id,
            user_id: joiner.id,
            proposed_by: proposer.id,
            commitment_count: 2,
        }
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        DomainEvent::ProposalConfirmed {
            proposal_id,
            title: "Sunset Worship Circle".to_string(),
            commitment_count: 2,
        }
    );

    // Rejected commits publish nothing
    let _ = CommitmentService::commit(&db.pool, &events, proposal_id, joiner.id, 2).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[actix_web::test]
async fn test_cancel_requires_proposer() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let proposer = create_test_user(&db.pool, "Proposer").await;
    let other = create_test_user(&db.pool, "Other").await;
    let proposal = create_test_proposal(&db.pool, &events, &proposer, QUORUM).await;
    let id = proposal.proposal.id;

    let result = ProposalService::cancel(&db.pool, &events, id, other.id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let cancelled = ProposalService::cancel(&db.pool, &events, id, proposer.id)
        .await
        .unwrap();
    assert_eq!(cancelled.proposal.status, ProposalStatus::Cancelled);

    // Terminal states do not move again
    let result = ProposalService::cancel(&db.pool, &events, id, proposer.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    let result = ProposalService::expire(&db.pool, &events, id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}
