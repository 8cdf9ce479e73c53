//! Session-based authentication flow

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wildchurch::events::EventBus;

use crate::common::{create_test_config, create_test_user, login_request, session_cookie, TestDb};

#[actix_web::test]
async fn test_register_then_me() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let config = create_test_config(10, Duration::from_secs(3600), 4);
    let app = crate::test_app!(db.pool, config, events);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "Hiker@WildChurch.test",
            "password": "trailhead42",
            "first_name": "Hiker"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let cookie = session_cookie(&resp);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "hiker@wildchurch.test");
    assert!(body["user"].get("password_hash").is_none());

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["first_name"], "Hiker");
    assert_eq!(me["display_name"], "Hiker");
}

#[actix_web::test]
async fn test_register_rejects_bad_input() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let config = create_test_config(10, Duration::from_secs(3600), 4);
    create_test_user(&db.pool, "Taken").await;
    let app = crate::test_app!(db.pool, config, events);

    let cases = [
        (json!({ "email": "not-an-email", "password": "password123" }), StatusCode::BAD_REQUEST),
        (json!({ "email": "short@wildchurch.test", "password": "short" }), StatusCode::BAD_REQUEST),
        (json!({ "email": "taken@wildchurch.test", "password": "password123" }), StatusCode::CONFLICT),
    ];

    for (body, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "body: {}", body);
    }
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let config = create_test_config(10, Duration::from_secs(3600), 4);
    create_test_user(&db.pool, "Ada").await;
    let app = crate::test_app!(db.pool, config, events);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "ada@wildchurch.test", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, login_request("Ada").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_me_without_session() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let config = create_test_config(10, Duration::from_secs(3600), 4);
    let app = crate::test_app!(db.pool, config, events);

    let req = test::TestRequest::get().uri("/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_inactive_user_cannot_log_in() {
    let db = TestDb::new().await;
    let events = EventBus::default();
    let config = create_test_config(10, Duration::from_secs(3600), 4);
    let user = create_test_user(&db.pool, "Dormant").await;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&db.pool)
        .await
        .unwrap();
    let app = crate::test_app!(db.pool, config, events);

    let resp = test::call_service(&app, login_request("Dormant").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
