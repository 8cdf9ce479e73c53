//! Unit tests for the CORS policy

use actix_web::{http::header, test, web, App, HttpResponse};
use wildchurch::config::SecurityConfig;
use wildchurch::middleware::cors::build_cors;

fn security(origins: &[&str]) -> SecurityConfig {
    SecurityConfig {
        ssl_proxy: false,
        session_secret_key: None,
        allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
    }
}

async fn ping() -> HttpResponse {
    HttpResponse::Ok().finish()
}

#[actix_web::test]
async fn test_configured_origin_gets_credentials() {
    let app = test::init_service(
        App::new()
            .wrap(build_cors(&security(&["https://map.wildchurch.test"])))
            .route("/ping", web::get().to(ping)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/ping")
        .insert_header((header::ORIGIN, "https://map.wildchurch.test"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://map.wildchurch.test"
    );
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[actix_web::test]
async fn test_unlisted_origin_is_not_allowed() {
    let app = test::init_service(
        App::new()
            .wrap(build_cors(&security(&["https://map.wildchurch.test"])))
            .route("/ping", web::get().to(ping)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/ping")
        .insert_header((header::ORIGIN, "https://evil.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[actix_web::test]
async fn test_open_policy_never_allows_credentials() {
    let app = test::init_service(
        App::new()
            .wrap(build_cors(&security(&[])))
            .route("/ping", web::get().to(ping)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/ping")
        .insert_header((header::ORIGIN, "https://anywhere.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_some());
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
        .is_none());
}
