use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::pagination::MAX_PAGE_SIZE;
use crate::services::NotificationService;

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/notifications - The current user's queued notifications, newest first
pub async fn list_notifications(
    pool: web::Data<DbPool>,
    query: web::Query<ListNotificationsQuery>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let notifications = NotificationService::list_for_user(pool.get_ref(), user.id(), limit).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// Configure notification routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/notifications", web::get().to(list_notifications));
}
