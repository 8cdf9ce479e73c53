use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;

use wildchurch::config;
use wildchurch::db;
use wildchurch::events::EventBus;
use wildchurch::middleware::cors::build_cors;
use wildchurch::notify::{self, NotificationHandler, QueueHandler};
use wildchurch::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!(
        "Starting WildChurch server on {}:{} (quorum: {}, pins: {} per {}s)",
        config.host,
        config.port,
        config.proposals.quorum,
        config.rate_limit.max_pins_per_window,
        config.rate_limit.pin_window.as_secs()
    );

    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Domain events feed the notification queue
    let events = EventBus::default();
    let handlers: Vec<Arc<dyn NotificationHandler>> =
        vec![Arc::new(QueueHandler::new(db_pool.clone()))];
    let notify_worker = notify::spawn(&events, handlers);

    let secret_key = match &config.security.session_secret_key {
        Some(key) => key.clone(),
        None => {
            log::warn!(
                "SESSION_SECRET_KEY not set, using random key (sessions won't persist across restarts)"
            );
            use rand::Rng;
            let random_bytes: Vec<u8> = (0..64).map(|_| rand::rng().random()).collect();
            hex::encode(random_bytes)
        }
    };

    let key = Key::from(secret_key.as_bytes());

    let host = config.host.clone();
    let port = config.port;
    let app_events = events.clone();

    let server = HttpServer::new(move || {
        let cors = build_cors(&config.security);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(app_events.clone()))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(cors)
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_name("wildchurch_session".to_string())
                    .cookie_secure(config.security.ssl_proxy)
                    .cookie_http_only(true)
                    .cookie_same_site(actix_web::cookie::SameSite::Lax)
                    .build(),
            )
            .configure(routes::health::configure)
            .configure(routes::auth::configure)
            .configure(routes::pins::configure)
            .configure(routes::proposals::configure)
            .configure(routes::notifications::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    let result = server.await;

    // The worker exits once the last bus handle is dropped
    drop(events);
    match tokio::time::timeout(Duration::from_secs(5), notify_worker).await {
        Ok(Err(e)) => log::error!("Notification worker ended abnormally: {}", e),
        Err(_) => log::warn!("Notification worker did not stop in time"),
        Ok(Ok(())) => {}
    }

    result
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
