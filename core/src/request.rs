//! Request handler trait and response types.
//!
//! This module defines the contract between the lifecycle reducer and the
//! caller-supplied capability that actually performs requests. The core
//! does not implement HTTP; it only shapes the calling convention:
//! `(url, params, data) → success response | failure wrapping a response`.
//!
//! # Design
//!
//! The trait is deliberately minimal. Retry, timeout, and cancellation
//! policies all live behind this boundary - the lifecycle machine performs
//! none and observes only the final outcome.
//!
//! # Dyn Compatibility
//!
//! This trait uses an explicit `Pin<Box<dyn Future>>` return instead of
//! `async fn` to enable trait object usage (`Arc<dyn RequestHandler>`).
//! This is required for the effect system where reducers create commands
//! that capture the handler.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Response metadata and payload from a settled request.
///
/// Both outcomes of a request carry this shape: a success is an
/// `HttpResponse` directly, a failure wraps one inside [`RequestError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Raw response payload
    pub data: Value,

    /// Response header pairs, in arrival order
    pub headers: Vec<(String, String)>,

    /// Status reason phrase (e.g. `"OK"`, `"Not Found"`)
    pub status_text: String,

    /// Numeric status code
    pub status: u16,
}

impl HttpResponse {
    /// Build a `200 OK` response with the given payload and no headers
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::with_status(data, 200, "OK")
    }

    /// Build a response with an explicit status line and no headers
    #[must_use]
    pub fn with_status(data: Value, status: u16, status_text: impl Into<String>) -> Self {
        Self {
            data,
            headers: Vec::new(),
            status_text: status_text.into(),
            status,
        }
    }

    /// Attach a header pair
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A failed request outcome.
///
/// There is no error taxonomy here: network, application, and malformed
/// response failures all surface the same way, as a response whose metadata
/// the reducer stashes on the rejected state.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("request failed: {} {}", response.status, response.status_text)]
pub struct RequestError {
    /// The failure response with the same metadata shape as a success
    pub response: HttpResponse,
}

impl RequestError {
    /// Wrap a failure response
    #[must_use]
    pub const fn new(response: HttpResponse) -> Self {
        Self { response }
    }
}

/// The caller-supplied capability that performs the actual request.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be safely captured by effect
/// commands and shared across tasks.
///
/// # Example
///
/// ```
/// use resource_flow_core::request::{HttpResponse, RequestError, RequestHandler};
/// use std::future::Future;
/// use std::pin::Pin;
///
/// struct StaticHandler;
///
/// impl RequestHandler for StaticHandler {
///     fn perform(
///         &self,
///         url: String,
///         _params: serde_json::Value,
///         _data: serde_json::Value,
///     ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, RequestError>> + Send + '_>> {
///         Box::pin(async move {
///             Ok(HttpResponse::ok(serde_json::json!({ "requested": url })))
///         })
///     }
/// }
/// ```
pub trait RequestHandler: Send + Sync {
    /// Perform the request.
    ///
    /// # Parameters
    ///
    /// - `url`: Target location, opaque to this crate
    /// - `params`: Query-like parameters from the triggering action
    /// - `data`: Body-like payload from the triggering action
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] wrapping the failure response. Any retry
    /// behavior happens inside the implementation; the caller sees only the
    /// final outcome.
    fn perform(
        &self,
        url: String,
        params: Value,
        data: Value,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, RequestError>> + Send + '_>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_response_shape() {
        let response = HttpResponse::ok(json!({"id": 1}));

        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert!(response.headers.is_empty());
        assert_eq!(response.data, json!({"id": 1}));
    }

    #[test]
    fn test_with_header_preserves_order() {
        let response = HttpResponse::ok(json!({}))
            .with_header("etag", "abc")
            .with_header("x-request-id", "42");

        assert_eq!(
            response.headers,
            vec![
                ("etag".to_string(), "abc".to_string()),
                ("x-request-id".to_string(), "42".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_display_includes_status_line() {
        let error = RequestError::new(HttpResponse::with_status(json!({}), 503, "Unavailable"));

        assert_eq!(error.to_string(), "request failed: 503 Unavailable");
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = HttpResponse::with_status(json!({}), 404, "Not Found");
        let encoded = serde_json::to_value(&response).unwrap();

        assert_eq!(encoded["statusText"], json!("Not Found"));
        assert_eq!(encoded["status"], json!(404));
    }
}
