//! Property tests for the resource lifecycle machine.
//!
//! The unit tests in the core crate pin individual transitions; these
//! properties pin the transitions' totality: they must hold from *any*
//! reachable state.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use resource_flow_core::effect::Effect;
use resource_flow_core::reducer::Reducer;
use resource_flow_core::request::{HttpResponse, RequestError, RequestHandler};
use resource_flow_core::resource::{
    PromiseState, Resource, ResourceAction, ResourceConfig, ResourceEnvironment, ResourceState,
};
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

struct InertHandler;

impl RequestHandler for InertHandler {
    fn perform(
        &self,
        _url: String,
        _params: Value,
        _data: Value,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, RequestError>> + Send + '_>> {
        Box::pin(async { Ok(HttpResponse::ok(json!({}))) })
    }
}

fn users() -> Resource {
    Resource::new(
        ResourceConfig::new("USERS", "users").with_request_handler(Arc::new(InertHandler)),
    )
    .expect("valid config")
}

fn env() -> ResourceEnvironment {
    ResourceEnvironment::new(Arc::new(InertHandler))
}

fn promise_states() -> impl Strategy<Value = PromiseState> {
    prop_oneof![
        Just(PromiseState::Init),
        Just(PromiseState::Pending),
        Just(PromiseState::Resolved),
        Just(PromiseState::Rejected),
    ]
}

fn states() -> impl Strategy<Value = ResourceState> {
    (
        promise_states(),
        prop::option::of(0u16..=999),
        prop::option::of("[A-Za-z ]{0,12}"),
        any::<i64>(),
    )
        .prop_map(|(promise_state, status, status_text, seed)| ResourceState {
            data: json!({ "seed": seed }),
            promise_state,
            headers: status.map(|_| Vec::new()),
            status_text,
            status,
        })
}

proptest! {
    /// Reset is total and idempotent: from any state it lands exactly on
    /// the configured initial state, with no effects.
    #[test]
    fn reset_restores_initial_state(mut state in states()) {
        let resource = users();
        let reducer = resource.reducer();

        let effects = reducer.reduce(&mut state, ResourceAction::Reset, &env());
        prop_assert_eq!(&state, &resource.initial_state());
        prop_assert!(matches!(effects.as_slice(), [Effect::None]));

        reducer.reduce(&mut state, ResourceAction::Reset, &env());
        prop_assert_eq!(&state, &resource.initial_state());
    }

    /// A request action always pends, whatever the prior state, and the
    /// scheduled command carries the action's own arguments.
    #[test]
    fn requested_always_pends(mut state in states(), page in 0u32..100) {
        let resource = users();
        let action = resource.request("/api/users", json!({ "page": page }), json!({}));

        let effects = resource.reducer().reduce(&mut state, action, &env());

        prop_assert_eq!(state.promise_state, PromiseState::Pending);
        prop_assert_eq!(effects.len(), 1);
        let Effect::Parallel(scheduled) = &effects[0] else {
            return Err(TestCaseError::fail("expected a parallel stage"));
        };
        let Effect::Request(command) = &scheduled[0] else {
            return Err(TestCaseError::fail("expected the request command first"));
        };
        prop_assert_eq!(command.url(), "/api/users");
        prop_assert_eq!(command.params(), &json!({ "page": page }));
    }

    /// Settling actions are accepted from any state (documented laxity) and
    /// always land on their terminal stage.
    #[test]
    fn settling_actions_are_total(mut state in states(), succeed in any::<bool>()) {
        let resource = users();
        let root = Box::new(resource.request("/api/users", json!({}), json!({})));

        let action = if succeed {
            ResourceAction::Received {
                success_response: HttpResponse::ok(json!({"id": 1})),
                root_action: root,
            }
        } else {
            ResourceAction::Failed {
                error: RequestError::new(HttpResponse::with_status(json!({}), 500, "Oops")),
                root_action: root,
            }
        };

        resource.reducer().reduce(&mut state, action, &env());

        let expected = if succeed {
            PromiseState::Resolved
        } else {
            PromiseState::Rejected
        };
        prop_assert_eq!(state.promise_state, expected);
        prop_assert!(state.status.is_some());
    }
}
