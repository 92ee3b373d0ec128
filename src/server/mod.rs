//! HTTP surface: query parameters in, JSON out.
//!
//! Every structured outcome, failures included, is an HTTP 200 with a JSON
//! body. Handlers never let a raw error escape; see `ApiError`.

pub mod handlers;
pub mod responses;

use crate::census::BroadbandLookup;
use crate::data::Dataset;
use crate::logging::LogRingBuffer;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use responses::ApiError;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub broadband: Arc<BroadbandLookup>,
    pub logs: LogRingBuffer,
}

impl AppState {
    pub fn new(broadband: BroadbandLookup, logs: LogRingBuffer) -> Self {
        Self {
            dataset: Arc::new(Dataset::new()),
            broadband: Arc::new(broadband),
            logs,
        }
    }
}

pub fn router(state: AppState, cors: bool) -> Router {
    let app = Router::new()
        .route("/loadcsv", get(handlers::load_csv))
        .route("/viewcsv", get(handlers::view_csv))
        .route("/searchcsv", get(handlers::search_csv))
        .route("/broadband", get(handlers::broadband))
        .route("/logs", get(handlers::logs))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind `address` and serve until Ctrl+C
pub async fn serve(address: &str, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
