//! API query and error types.

use serde::{Deserialize, Serialize};

/// Optional query parameters for the offer endpoint.
#[derive(Debug, Deserialize)]
pub struct OfferQuery {
    /// Projection horizon override (years, >= 1).
    pub horizon: Option<u32>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
