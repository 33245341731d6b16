//! Loan Approval Server
//!
//! REST endpoint and web form over one shared classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    LOAN APPROVAL SERVER                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────────┐          ┌─────────────────────────────┐ │
//! │  │  REST API     │          │  Web Form                   │ │
//! │  │  /predict     │          │  /  and  /prediction        │ │
//! │  └───────┬───────┘          └──────────────┬──────────────┘ │
//! │          └──────────────┬──────────────────┘                │
//! │                         ▼                                   │
//! │              ┌─────────────────────┐                        │
//! │              │  LoanClassifier     │  schema + ensemble,    │
//! │              │  (Arc, read-only)   │  loaded before bind    │
//! │              └─────────────────────┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod templates;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use handlebars::Handlebars;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loan_core::model::DecisionThreshold;
use loan_core::LoanClassifier;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "loan_server=debug,loan_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();

    tracing::info!("Loan Approval Server starting ({})...", config.environment);
    tracing::info!("Model: {}", config.model_path.display());

    // Load the classifier before accepting requests
    let classifier = LoanClassifier::new(DecisionThreshold::new(config.decision_threshold));
    match classifier.load_from_file(&config.model_path) {
        Ok(()) => tracing::info!("Model loaded, decision threshold {}", classifier.threshold().cutoff()),
        Err(e) => tracing::error!("Model unavailable, serving in not-ready mode: {}", e),
    }

    // Build application state
    let state = AppState {
        classifier: Arc::new(classifier),
        templates: Arc::new(templates::registry().context("Failed to register templates")?),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<LoanClassifier>,
    pub templates: Arc<Handlebars<'static>>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // JSON API
    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/api/v1/model", get(handlers::predict::model_info));

    // Web form
    let form_routes = Router::new()
        .route("/", get(handlers::form::index))
        .route("/prediction", post(handlers::form::submit));

    let cors = if state.config.is_production() {
        CorsLayer::new().allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(api_routes)
        .merge(form_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
