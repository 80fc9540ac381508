//! # Resource Flow Core
//!
//! Core traits and types for the Resource Flow architecture.
//!
//! This crate turns a declarative [`ResourceConfig`](resource::ResourceConfig)
//! into the conventional state management artifacts for one *resource* of
//! asynchronous request/response data:
//!
//! - action constructors ([`Resource::request`](resource::Resource::request),
//!   [`Resource::reset`](resource::Resource::reset), plus optional
//!   `update`/`delete`),
//! - a pure reducer implementing a four-state lifecycle machine
//!   (`Init → Pending → Resolved | Rejected`),
//! - a memoized selector over the enclosing application state.
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O): reducers return
//!   [`Effect`](effect::Effect) *values*; the runtime crate interprets them
//! - Dependency Injection via Environment: the request handler is a
//!   trait object injected through
//!   [`ResourceEnvironment`](resource::ResourceEnvironment)
//!
//! ## Example
//!
//! ```
//! use resource_flow_core::resource::{Resource, ResourceConfig};
//! use resource_flow_core::request::{HttpResponse, RequestError, RequestHandler};
//! use std::future::Future;
//! use std::pin::Pin;
//! use std::sync::Arc;
//!
//! struct NoopHandler;
//!
//! impl RequestHandler for NoopHandler {
//!     fn perform(
//!         &self,
//!         _url: String,
//!         _params: serde_json::Value,
//!         _data: serde_json::Value,
//!     ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, RequestError>> + Send + '_>> {
//!         Box::pin(async { Ok(HttpResponse::ok(serde_json::json!({}))) })
//!     }
//! }
//!
//! let users = Resource::new(
//!     ResourceConfig::new("USERS", "users").with_request_handler(Arc::new(NoopHandler)),
//! )?;
//!
//! let action = users.request("/api/users", serde_json::json!({}), serde_json::json!({}));
//! assert_eq!(action.type_tag(users.action_prefix()), "USERS_REQUESTED");
//! # Ok::<(), resource_flow_core::resource::ConfigError>(())
//! ```

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

pub mod effect;
pub mod reducer;
pub mod request;
pub mod resource;
pub mod selector;
pub mod wire;

pub use effect::Effect;
pub use reducer::Reducer;
pub use request::{HttpResponse, RequestError, RequestHandler};
pub use resource::{
    ConfigError, PromiseState, Resource, ResourceAction, ResourceConfig, ResourceReducer,
    ResourceState,
};
pub use selector::MemoSelector;
