//! Common types and traits for simulated device handlers.

use axum::http::{Method, StatusCode};
use serde_json::Value;

use crate::world::World;

/// An inbound request as seen by device handlers.
///
/// `uri` is the path including the query string, matched the way the
/// imitated vendor APIs are addressed (e.g. `/rpc/Switch.GetStatus?id=0`).
#[derive(Debug, Clone)]
pub struct DeviceRequest {
    pub method: Method,
    pub uri: String,
    /// Parsed JSON body, or an empty object when the body is absent or not JSON.
    pub body: Value,
}

impl DeviceRequest {
    /// Creates a request with an empty object body.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: Value::Object(Default::default()),
        }
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Path without the query string.
    pub fn path(&self) -> &str {
        self.uri
            .split_once('?')
            .map_or(self.uri.as_str(), |(path, _)| path)
    }
}

/// What the server loop should do once a reply has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Keep serving.
    #[default]
    Continue,
    /// Stop the server after the reply is delivered.
    Shutdown,
}

/// A handler's answer to a claimed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    /// JSON body; `None` sends an empty body.
    pub body: Option<Value>,
    pub disposition: Disposition,
}

impl Reply {
    /// `200 OK` with a JSON body.
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
            disposition: Disposition::Continue,
        }
    }

    /// `200 OK` with no body.
    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
            disposition: Disposition::Continue,
        }
    }

    /// Overrides the status code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Marks the reply as the last one this server sends.
    pub fn then_shutdown(mut self) -> Self {
        self.disposition = Disposition::Shutdown;
        self
    }
}

/// A unit owning a disjoint slice of the imitated API surface.
///
/// Handlers are consulted in a fixed order. Returning `None` declines the
/// request and passes it to the next handler.
pub trait Handler: Send + Sync {
    /// Short name used in logs and the request journal.
    fn name(&self) -> &'static str;

    /// Claims and answers `request`, or declines with `None`.
    ///
    /// # Arguments
    ///
    /// * `request` - The inbound request
    /// * `world` - Exclusive access to the world document for this request
    fn handle(&self, request: &DeviceRequest, world: &mut World) -> Option<Reply>;
}
