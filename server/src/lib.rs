//! StudyStream HTTP API: routing, authentication and error mapping on top
//! of `studystream-core`.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use studystream_core::{
    config::StudyConfig, store::StudyStore, ServiceOptions, StudyService,
};
use tower_http::cors::CorsLayer;

use crate::{config::ServerConfig, state::AppState};

/// Open and migrate the database, load catalogs and seed content.
pub fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let store = StudyStore::open(&config.db)
        .with_context(|| format!("opening database {}", config.db))?;
    store.migrate().context("running migrations")?;

    let catalogs = match &config.data_dir {
        Some(dir) => StudyConfig::load(dir)?,
        None => StudyConfig::builtin()?,
    };

    let options = ServiceOptions {
        token_secret: config.jwt_secret()?,
        token_ttl_hours: config.token_ttl_hours,
        bcrypt_cost: config.bcrypt_cost,
    };
    let service = StudyService::new(store, catalogs, options);

    if config.no_seed {
        log::info!("Skipping content seeding");
    } else {
        let inserted = service.seed_catalog().context("seeding content catalog")?;
        log::info!("Seeded {inserted} content items");
    }

    Ok(AppState::new(service, config.environment))
}

/// All routes with request logging and the JSON 404 fallback.
pub fn router(state: AppState) -> Router {
    routes::api_routes()
        .fallback(routes::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), error::internal_error_details))
        .layer(middleware::from_fn(logging::log_requests))
        .with_state(state)
}

pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let state = build_state(&config)?;
    let app = router(state).layer(cors_layer(&config.cors_origins)?);

    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    log::info!("StudyStream API listening on {address} ({:?})", config.environment);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router (and with it the last handle on the connection) is gone.
    log::info!("Database connection closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    log::info!("Shutting down gracefully");
}
