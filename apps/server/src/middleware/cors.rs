use actix_cors::Cors;
use actix_web::http::header;

use crate::config::SecurityConfig;

/// Builds the CORS policy.
///
/// With configured origins, only those may call the API and cookies are
/// allowed. Without any, every origin is accepted but credentials are not.
pub fn build_cors(security: &SecurityConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);

    if security.allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }

    security
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
        .supports_credentials()
}
