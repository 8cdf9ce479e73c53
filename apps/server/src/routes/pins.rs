use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::events::EventBus;
use crate::models::{CreatePin, CreatePinComment, CreateSafetyReview};
use crate::pagination::{normalize, ListPinsQuery, OffsetPaginatedResponse};
use crate::services::{CommentService, PinService, ReviewService};

/// GET /api/pins - List active pins with pagination
pub async fn list_pins(
    pool: web::Data<DbPool>,
    query: web::Query<ListPinsQuery>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let (page, per_page) = normalize(query.page, query.per_page);
    let (pins, total_count) = PinService::list_active(pool.get_ref(), page, per_page).await?;

    Ok(HttpResponse::Ok().json(OffsetPaginatedResponse::new(
        pins,
        total_count,
        page,
        per_page,
    )))
}

/// GET /api/pins/{id} - Get a pin by ID
pub async fn get_pin(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let pin = PinService::get_by_id(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pin))
}

/// POST /api/pins - Drop a pin (rate limited per user)
pub async fn create_pin(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    events: web::Data<EventBus>,
    body: web::Json<CreatePin>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let created = PinService::create(
        pool.get_ref(),
        events.get_ref(),
        user.id(),
        body.into_inner(),
        &config.rate_limit,
    )
    .await?;

    Ok(HttpResponse::Created().json(created))
}

/// GET /api/pins/{id}/reviews - Publicly visible safety reviews, newest first
pub async fn list_reviews(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let reviews = ReviewService::list_visible(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /api/pins/{id}/reviews - Review a pin for safety (once per user)
pub async fn create_review(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CreateSafetyReview>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let review =
        ReviewService::create(pool.get_ref(), path.into_inner(), user.id(), body.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /api/pins/{id}/comments - The pin's message board, oldest first
pub async fn list_comments(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let comments = CommentService::list(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/pins/{id}/comments - Post on the pin's message board
pub async fn create_comment(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CreatePinComment>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let comment =
        CommentService::create(pool.get_ref(), path.into_inner(), user.id(), body.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Configure pin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/pins")
            .route("", web::get().to(list_pins))
            .route("", web::post().to(create_pin))
            .route("/{id}", web::get().to(get_pin))
            .route("/{id}/reviews", web::get().to(list_reviews))
            .route("/{id}/reviews", web::post().to(create_review))
            .route("/{id}/comments", web::get().to(list_comments))
            .route("/{id}/comments", web::post().to(create_comment)),
    );
}
