//! HTTP API gateway for StudyBuddy.
//!
//! Exposes health checks, material upload and management, and chat.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use studybuddy_agent::{ModelGateway, StudyBuddy};
use studybuddy_core::event::EventBus;

pub use api::{ApiState, SharedApiState, api_router};

/// Build the full router.
///
/// Layers applied:
/// - Permissive CORS so a browser frontend on another origin can call the API
/// - Request body size limit (uploads included)
/// - HTTP trace logging
pub fn build_router(state: SharedApiState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(api_router(state))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the provider, store and StudyBuddy session once and shares them
/// across all requests.
pub async fn start(config: studybuddy_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let providers = studybuddy_providers::build_from_config(&config);
    let provider = providers
        .default()
        .ok_or("No default provider configured; set an API key")?;

    let store = studybuddy_store::build_store(&config.storage).await?;
    let event_bus = Arc::new(EventBus::default());
    let session = StudyBuddy::from_config(
        ModelGateway::from_config(provider, &config),
        store.clone(),
        &config.agent,
    )?
    .with_event_bus(event_bus.clone());

    let state = Arc::new(ApiState {
        store,
        session: Arc::new(session),
        event_bus,
    });

    let app = build_router(state, config.gateway.max_upload_bytes);

    info!(addr = %addr, model = %config.default_model, storage = %config.storage.backend, "StudyBuddy API starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    status: &'static str,
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "StudyBuddy API",
        status: "running",
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
