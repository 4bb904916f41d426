//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, OfferQuery};
use crate::engine::{OfferResult, run_offer_pipeline};
use crate::input::{ProjectState, derive_input};

/// Returns the offer snapshot, recomputed when a horizon override is given.
///
/// `GET /offer` → 200 + `OfferResult` JSON
/// `GET /offer?horizon=N` → recomputed for N years (N >= 1)
/// `GET /offer?horizon=0` → 400 + `ErrorResponse`
pub async fn get_offer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OfferQuery>,
) -> impl IntoResponse {
    match query.horizon {
        None => Ok(Json(state.result.clone())),
        Some(0) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "`horizon` must be >= 1".to_string(),
            }),
        )),
        Some(horizon) => {
            let mut input = state.input.clone();
            input.horizon_years = horizon;
            Ok(Json(run_offer_pipeline(&input, &state.constants)))
        }
    }
}

/// Computes a fresh offer from a posted wizard state.
///
/// `POST /offer` with a JSON project state → 200 + `OfferResult` JSON.
/// A structurally invalid body is rejected by the extractor with a
/// 400-class status before the handler runs.
pub async fn post_offer(
    State(state): State<Arc<AppState>>,
    Json(project): Json<ProjectState>,
) -> Json<OfferResult> {
    let input = derive_input(&project, &state.constants);
    Json(run_offer_pipeline(&input, &state.constants))
}
