//! KneeForce Server
//!
//! HTTP surface for knee contact force prediction.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    KNEEFORCE SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────────┐ │
//! │  │  Router   │→ │ Feature      │→ │ Tree ensemble        │ │
//! │  │  (Axum)   │  │ validation   │  │ + TreeSHAP           │ │
//! │  └───────────┘  └──────────────┘  └──────────┬───────────┘ │
//! │                                              ▼             │
//! │                                   ┌──────────────────────┐ │
//! │                                   │ Model (loaded once,  │ │
//! │                                   │ shared via Arc)      │ │
//! │                                   └──────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use kneeforce_core::{constants, registry, Model, SafetyConfig};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (core `log` records are bridged by `init`)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kneeforce_server=debug,kneeforce_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("{} server starting ({})", constants::APP_NAME, config.environment);

    // A model that fails to load aborts startup
    let model = registry::load_global(&config.model_path, config.model_sha256.as_deref())
        .with_context(|| format!("failed to load model from {}", config.model_path))?;
    tracing::info!(
        "Model {} ready: {} trees, layout {:08x}",
        model.name(),
        model.n_trees(),
        model.layout().hash()
    );

    SafetyConfig::set_explain(config.explain_enabled);

    // Build application state
    let state = AppState {
        model,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<Model>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/features", get(handlers::features::schema))
        .route("/api/v1/model", get(handlers::model::status))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
