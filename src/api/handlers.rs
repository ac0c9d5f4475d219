//! Request logging and dispatch into the device handler chain.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::AppState;
use super::types::ErrorResponse;
use crate::devices::{DeviceRequest, Disposition};
use crate::journal::UNCLAIMED;

/// Logs method and URI of every request before routing.
pub async fn log_request(request: Request, next: Next) -> Response {
    info!(method = %request.method(), uri = %request.uri(), "request");
    next.run(request).await
}

/// Offers the request to the handler chain.
///
/// Any method, any path. Unclaimed requests get `404` + `ErrorResponse`.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let uri = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());
    let request = DeviceRequest {
        method,
        uri,
        body: parse_body(&headers, &body),
    };

    let outcome = {
        let mut world = state.lock_world();
        state.chain.dispatch(&request, &mut world)
    };

    let Some((handler, reply)) = outcome else {
        debug!(uri = %request.uri, "no handler claimed request");
        state.journal.record(
            request.method.as_str(),
            &request.uri,
            UNCLAIMED,
            StatusCode::NOT_FOUND.as_u16(),
        );
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "not found".to_string(),
            }),
        )
            .into_response();
    };

    debug!(handler, status = reply.status.as_u16(), "request handled");
    state.journal.record(
        request.method.as_str(),
        &request.uri,
        handler,
        reply.status.as_u16(),
    );
    if reply.disposition == Disposition::Shutdown {
        state.request_shutdown();
    }
    reply.into_response()
}

/// Parses an `application/json` body.
///
/// Any other content type, an absent body or malformed JSON reads as `{}`.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Value {
    if !is_json(headers) {
        return Value::Object(Map::new());
    }
    serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// `Content-Type: application/json`, parameters such as `charset` allowed.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}
