//! # Resource Flow Testing
//!
//! Testing utilities and helpers for the Resource Flow architecture.
//!
//! This crate provides:
//! - A scriptable mock of the request-handler capability
//! - The [`ReducerTest`] fluent harness for Given-When-Then reducer tests
//! - Assertion helpers for effect lists
//!
//! ## Example
//!
//! ```
//! use resource_flow_testing::mocks::MockRequestHandler;
//! use resource_flow_core::request::HttpResponse;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let handler = Arc::new(MockRequestHandler::new());
//! handler.queue_success(HttpResponse::ok(json!({"id": 1})));
//! // hand the Arc to a ResourceConfig / ResourceEnvironment, dispatch a
//! // request, then assert on handler.calls()
//! ```

pub mod reducer_test;

/// Mock implementations of the environment capabilities
pub mod mocks {
    use parking_lot::Mutex;
    use resource_flow_core::request::{HttpResponse, RequestError, RequestHandler};
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;

    /// One recorded invocation of the mock handler
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        /// The URL the handler was called with
        pub url: String,
        /// The params payload
        pub params: Value,
        /// The data payload
        pub data: Value,
    }

    /// Scriptable request handler for deterministic tests.
    ///
    /// Outcomes are served FIFO from a queue; every invocation is recorded.
    /// When the script is exhausted the handler falls back to an empty
    /// `200 OK` success, so incidental requests don't fail a test that
    /// isn't about them.
    ///
    /// # Example
    ///
    /// ```
    /// use resource_flow_testing::mocks::MockRequestHandler;
    /// use resource_flow_core::request::{HttpResponse, RequestHandler};
    /// use serde_json::json;
    ///
    /// let handler = MockRequestHandler::new();
    /// handler.queue_success(HttpResponse::ok(json!({"id": 1})));
    ///
    /// let outcome = futures::executor::block_on(handler.perform(
    ///     "/api/users".to_string(),
    ///     json!({}),
    ///     json!({}),
    /// ));
    /// assert_eq!(outcome.unwrap().data, json!({"id": 1}));
    /// assert_eq!(handler.calls().len(), 1);
    /// ```
    #[derive(Default)]
    pub struct MockRequestHandler {
        script: Mutex<VecDeque<Result<HttpResponse, RequestError>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockRequestHandler {
        /// Create a handler with an empty script
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a success outcome
        pub fn queue_success(&self, response: HttpResponse) {
            self.script.lock().push_back(Ok(response));
        }

        /// Queue a failure outcome
        pub fn queue_failure(&self, error: RequestError) {
            self.script.lock().push_back(Err(error));
        }

        /// All invocations recorded so far, in call order
        #[must_use]
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().clone()
        }
    }

    impl RequestHandler for MockRequestHandler {
        fn perform(
            &self,
            url: String,
            params: Value,
            data: Value,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, RequestError>> + Send + '_>> {
            self.calls.lock().push(RecordedCall {
                url,
                params: params.clone(),
                data: data.clone(),
            });

            let outcome = self
                .script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::ok(Value::Object(serde_json::Map::new()))));

            Box::pin(async move { outcome })
        }
    }

    /// Build a `200 OK` success outcome with the given payload
    #[must_use]
    pub fn ok_response(data: Value) -> HttpResponse {
        HttpResponse::ok(data)
    }

    /// Build a failure outcome with the given status code
    #[must_use]
    pub fn error_response(status: u16, status_text: impl Into<String>) -> RequestError {
        RequestError::new(HttpResponse::with_status(
            Value::Object(serde_json::Map::new()),
            status,
            status_text,
        ))
    }
}

// Re-export commonly used items
pub use mocks::{MockRequestHandler, RecordedCall, error_response, ok_response};
pub use reducer_test::{ReducerTest, assertions};
