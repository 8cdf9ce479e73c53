use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::events::EventBus;
use crate::models::CreateProposal;
use crate::pagination::{normalize, ListProposalsQuery, OffsetPaginatedResponse};
use crate::services::{CommitmentService, ProposalService};

/// GET /api/proposals - List proposals by status (default: proposed)
pub async fn list_proposals(
    pool: web::Data<DbPool>,
    query: web::Query<ListProposalsQuery>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let (page, per_page) = normalize(query.page, query.per_page);
    let (proposals, total_count) =
        ProposalService::list_offset(pool.get_ref(), query.status, query.order, page, per_page)
            .await?;

    Ok(HttpResponse::Ok().json(OffsetPaginatedResponse::new(
        proposals,
        total_count,
        page,
        per_page,
    )))
}

/// POST /api/proposals - Propose a gathering (the proposer is committed automatically)
pub async fn create_proposal(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    events: web::Data<EventBus>,
    body: web::Json<CreateProposal>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let proposal = ProposalService::create(
        pool.get_ref(),
        events.get_ref(),
        user.id(),
        body.into_inner(),
        config.proposals.quorum,
    )
    .await?;

    Ok(HttpResponse::Created().json(proposal))
}

/// GET /api/proposals/{id} - Get a proposal with its commitment count
pub async fn get_proposal(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let proposal = ProposalService::get_by_id(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(proposal))
}

/// POST /api/proposals/{id}/commit - Commit the current user to a proposal
pub async fn commit(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    events: web::Data<EventBus>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let outcome = CommitmentService::commit(
        pool.get_ref(),
        events.get_ref(),
        path.into_inner(),
        user.id(),
        config.proposals.quorum,
    )
    .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /api/proposals/{id}/commitments - Committed users, earliest first
pub async fn list_commitments(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let users = CommitmentService::list(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /api/proposals/{id}/cancel - Cancel a proposal (proposer only)
pub async fn cancel_proposal(
    pool: web::Data<DbPool>,
    events: web::Data<EventBus>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let proposal =
        ProposalService::cancel(pool.get_ref(), events.get_ref(), path.into_inner(), user.id())
            .await?;
    Ok(HttpResponse::Ok().json(proposal))
}

/// Configure proposal routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/proposals")
            .route("", web::get().to(list_proposals))
            .route("", web::post().to(create_proposal))
            .route("/{id}", web::get().to(get_proposal))
            .route("/{id}/commit", web::post().to(commit))
            .route("/{id}/commitments", web::get().to(list_commitments))
            .route("/{id}/cancel", web::post().to(cancel_proposal)),
    );
}
