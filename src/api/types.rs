//! Wire-level response types.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::devices::Reply;

/// Error response body for unclaimed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}
