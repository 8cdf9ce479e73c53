//! Common test utilities and helpers
//!
//! This module provides shared functionality for the integration tests.

#![allow(unused_imports)]

pub mod fixtures;

pub use db::TestDb;
pub use fixtures::{
    create_test_config, create_test_pin, create_test_proposal, create_test_user,
    insert_bare_proposal, login_request, proposal_input, session_cookie, session_key,
    stored_commitments, stored_status,
};

/// Builds the full API app over the given pool, config and event bus
#[macro_export]
macro_rules! test_app {
    ($pool:expr, $config:expr, $events:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new($config))
                .app_data(actix_web::web::Data::new($events.clone()))
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        $crate::common::session_key(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(wildchurch::routes::health::configure)
                .configure(wildchurch::routes::auth::configure)
                .configure(wildchurch::routes::pins::configure)
                .configure(wildchurch::routes::proposals::configure)
                .configure(wildchurch::routes::notifications::configure),
        )
        .await
    };
}
