//! Side-effect descriptions.
//!
//! Effects describe side effects to be performed by the runtime.
//! They are values (not execution): reducers build them, the store
//! interprets them. This split keeps every reducer synchronous, pure,
//! and testable without I/O.

use crate::request::{HttpResponse, RequestError, RequestHandler};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Effect type - describes a side effect to be executed
///
/// Effects are NOT executed immediately. They are descriptions of what should
/// happen, returned from reducers and executed by the Store runtime.
///
/// # Type Parameters
///
/// - `Action`: The action type that effects can produce (feedback loop)
#[allow(missing_docs)]
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// Dispatch an action back into the store
    ///
    /// This is how lifecycle hook lists surface: each hook function maps the
    /// triggering action to an outbound action, and the reducer schedules one
    /// `Action` effect per hook.
    Action(Box<Action>),

    /// Arbitrary async computation
    ///
    /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
    Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

    /// Invoke the request handler and feed the outcome back as an action
    ///
    /// This is the main lifecycle command: the runtime calls the handler with
    /// the command's `(url, params, data)` and maps success or failure
    /// through the command's action constructors.
    Request(RequestCommand<Action>),

    /// Run effects in parallel
    Parallel(Vec<Effect<Action>>),

    /// Run effects sequentially
    Sequential(Vec<Effect<Action>>),
}

// Manual Debug implementation since Future and the boxed constructors
// don't implement Debug
impl<Action> std::fmt::Debug for Effect<Action>
where
    Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Action(action) => f.debug_tuple("Effect::Action").field(action).finish(),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            Effect::Request(command) => f.debug_tuple("Effect::Request").field(command).finish(),
            Effect::Parallel(effects) => {
                f.debug_tuple("Effect::Parallel").field(effects).finish()
            },
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
        }
    }
}

impl<Action> Effect<Action> {
    /// Combine effects to run in parallel
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Chain effects to run sequentially
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }
}

/// Type alias for the boxed action constructors carried by a command
type ActionConstructor<In, Action> = Box<dyn FnOnce(In) -> Action + Send>;

/// A scheduled request-handler invocation
///
/// Carries everything the runtime needs to perform the call later: the
/// handler itself, the call arguments captured from the triggering action,
/// and the two constructors that turn the outcome into a feedback action.
///
/// The argument accessors ([`url`](Self::url), [`params`](Self::params),
/// [`data`](Self::data)) let tests assert what was scheduled without
/// executing anything.
pub struct RequestCommand<Action> {
    handler: Arc<dyn RequestHandler>,
    url: String,
    params: Value,
    data: Value,
    on_success: ActionConstructor<HttpResponse, Action>,
    on_error: ActionConstructor<RequestError, Action>,
}

impl<Action> RequestCommand<Action> {
    /// Create a new request command
    ///
    /// # Arguments
    ///
    /// - `handler`: The request-performing capability to invoke
    /// - `url`, `params`, `data`: Call arguments, captured from the
    ///   triggering action
    /// - `on_success`: Maps a successful [`HttpResponse`] to a feedback action
    /// - `on_error`: Maps a [`RequestError`] to a feedback action
    pub fn new(
        handler: Arc<dyn RequestHandler>,
        url: impl Into<String>,
        params: Value,
        data: Value,
        on_success: impl FnOnce(HttpResponse) -> Action + Send + 'static,
        on_error: impl FnOnce(RequestError) -> Action + Send + 'static,
    ) -> Self {
        Self {
            handler,
            url: url.into(),
            params,
            data,
            on_success: Box::new(on_success),
            on_error: Box::new(on_error),
        }
    }

    /// The URL the handler will be called with
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The query/params payload the handler will be called with
    #[must_use]
    pub const fn params(&self) -> &Value {
        &self.params
    }

    /// The body payload the handler will be called with
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Perform the call and map its outcome to a feedback action
    ///
    /// Consumes the command. This is the only place the handler is actually
    /// invoked; reducers never call it.
    pub async fn run(self) -> Action {
        match self.handler.perform(self.url, self.params, self.data).await {
            Ok(response) => (self.on_success)(response),
            Err(error) => (self.on_error)(error),
        }
    }
}

impl<Action> std::fmt::Debug for RequestCommand<Action> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCommand")
            .field("url", &self.url)
            .field("params", &self.params)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Done { status: u16 },
        Broke,
    }

    struct StubHandler {
        outcome: Result<HttpResponse, RequestError>,
    }

    impl RequestHandler for StubHandler {
        fn perform(
            &self,
            _url: String,
            _params: Value,
            _data: Value,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, RequestError>> + Send + '_>> {
            let outcome = self.outcome.clone();
            Box::pin(async move { outcome })
        }
    }

    fn command(outcome: Result<HttpResponse, RequestError>) -> RequestCommand<TestAction> {
        RequestCommand::new(
            Arc::new(StubHandler { outcome }),
            "/api/things",
            json!({"page": 1}),
            json!({}),
            |response| TestAction::Done {
                status: response.status,
            },
            |_error| TestAction::Broke,
        )
    }

    #[test]
    fn test_command_exposes_call_arguments() {
        let cmd = command(Ok(HttpResponse::ok(json!([]))));

        assert_eq!(cmd.url(), "/api/things");
        assert_eq!(cmd.params(), &json!({"page": 1}));
        assert_eq!(cmd.data(), &json!({}));
    }

    #[test]
    fn test_command_maps_success() {
        let cmd = command(Ok(HttpResponse::ok(json!([]))));

        let action = futures::executor::block_on(cmd.run());
        assert_eq!(action, TestAction::Done { status: 200 });
    }

    #[test]
    fn test_command_maps_failure() {
        let cmd = command(Err(RequestError::new(HttpResponse::with_status(
            json!({}),
            500,
            "Internal Server Error",
        ))));

        let action = futures::executor::block_on(cmd.run());
        assert_eq!(action, TestAction::Broke);
    }
}
