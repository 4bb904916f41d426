//! REST API for the offer engine.
//!
//! Provides two endpoints:
//! - `GET /offer` — the precomputed offer snapshot, optionally recomputed
//!   for a different projection horizon
//! - `POST /offer` — fresh computation from a posted wizard state

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::config::EngineConstants;
use crate::engine::OfferResult;
use crate::input::EngineInput;

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the initial pipeline run and wrapped in `Arc` —
/// no locks needed since every computation produces a fresh result.
pub struct AppState {
    /// Constant set used for all computations.
    pub constants: EngineConstants,
    /// Input the snapshot was computed from.
    pub input: EngineInput,
    /// Precomputed offer snapshot.
    pub result: OfferResult,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/offer", get(handlers::get_offer).post(handlers::post_offer))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("offer API listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
