use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use issuetracker::config::{self, CorsConfig, StoreConfig};
use issuetracker::routes;
use issuetracker::store::{IssueStore, MemoryIssueStore, PgIssueStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!(
        "Starting issue tracker on {}:{} ({} store)",
        config.host,
        config.port,
        config.store.name()
    );

    let store = build_store(&config.store).await?;
    let store = web::Data::from(store);

    let host = config.host.clone();
    let port = config.port;
    let cors_config = config.cors.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            // Middleware
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(build_cors(&cors_config))
            .configure(routes::health::configure)
            .configure(routes::issues::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Connects the configured backend, running migrations for PostgreSQL
async fn build_store(config: &StoreConfig) -> std::io::Result<Arc<dyn IssueStore>> {
    match config {
        StoreConfig::Postgres(database) => {
            let store = PgIssueStore::connect(database).await.map_err(|e| {
                log::error!("Database pool error: {}", e);
                std::io::Error::other(e.to_string())
            })?;

            store.migrate().await.map_err(|e| {
                log::error!("Migration error: {}", e);
                std::io::Error::other(e.to_string())
            })?;

            Ok(Arc::new(store))
        }
        StoreConfig::Memory => {
            log::warn!("Using in-memory issue store, issues are lost on restart");
            Ok(Arc::new(MemoryIssueStore::new()))
        }
    }
}

fn build_cors(config: &CorsConfig) -> Cors {
    let cors = match &config.allowed_origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
        ])
        .max_age(3600)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
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
