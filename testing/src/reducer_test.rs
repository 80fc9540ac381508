//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable
//! Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use resource_flow_core::{Effect, Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// use resource_flow_testing::ReducerTest;
///
/// ReducerTest::new(resource.reducer())
///     .with_env(resource.environment())
///     .given_state(resource.initial_state())
///     .when_action(resource.reset())
///     .then_state(|state| {
///         assert_eq!(state.promise_state, PromiseState::Init);
///     })
///     .then_effects(|effects| {
///         assertions::assert_no_effects(effects);
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let action = self.action.expect("Action must be set with when_action()");

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        // Execute reducer
        let effects = self.reducer.reduce(&mut state, action, &env);

        // Run state assertions
        for assertion in self.state_assertions {
            assertion(&state);
        }

        // Run effect assertions
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use resource_flow_core::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.is_empty() || matches!(effects, [Effect::None]),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one `Request` command,
    /// searching through `Parallel`/`Sequential` stages
    ///
    /// # Panics
    ///
    /// Panics if no `Request` effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_request_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(contains_request),
            "Expected at least one Request effect, but none found"
        );
    }

    /// Assert that effects contain at least one `Action` effect,
    /// searching through `Parallel`/`Sequential` stages
    ///
    /// # Panics
    ///
    /// Panics if no `Action` effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_action_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(contains_action),
            "Expected at least one Action effect, but none found"
        );
    }

    fn contains_request<A>(effect: &Effect<A>) -> bool {
        match effect {
            Effect::Request(_) => true,
            Effect::Parallel(children) | Effect::Sequential(children) => {
                children.iter().any(contains_request)
            },
            _ => false,
        }
    }

    fn contains_action<A>(effect: &Effect<A>) -> bool {
        match effect {
            Effect::Action(_) => true,
            Effect::Parallel(children) | Effect::Sequential(children) => {
                children.iter().any(contains_action)
            },
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use resource_flow_core::request::HttpResponse;
    use resource_flow_core::resource::{
        PromiseState, Resource, ResourceAction, ResourceConfig, ResourceState,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn users() -> Resource {
        Resource::new(
            ResourceConfig::new("USERS", "users")
                .with_request_handler(Arc::new(crate::MockRequestHandler::new())),
        )
        .unwrap()
    }

    #[test]
    fn test_reducer_test_reset() {
        let resource = users();

        ReducerTest::new(resource.reducer())
            .with_env(resource.environment())
            .given_state(ResourceState {
                promise_state: PromiseState::Resolved,
                data: json!({"id": 1}),
                ..ResourceState::default()
            })
            .when_action(resource.reset())
            .then_state(|state| {
                assert_eq!(state.promise_state, PromiseState::Init);
                assert_eq!(state.data, json!({}));
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_request_schedules_command() {
        let resource = users();

        ReducerTest::new(resource.reducer())
            .with_env(resource.environment())
            .given_state(resource.initial_state())
            .when_action(resource.request("/api/users", json!({}), json!({})))
            .then_state(|state| {
                assert_eq!(state.promise_state, PromiseState::Pending);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_request_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_received_resolves() {
        let resource = users();
        let root = resource.request("/api/users", json!({}), json!({}));

        ReducerTest::new(resource.reducer())
            .with_env(resource.environment())
            .given_state(ResourceState {
                promise_state: PromiseState::Pending,
                ..ResourceState::default()
            })
            .when_action(ResourceAction::Received {
                success_response: HttpResponse::ok(json!({"id": 1})),
                root_action: Box::new(root),
            })
            .then_state(|state| {
                assert_eq!(state.promise_state, PromiseState::Resolved);
                assert_eq!(state.data, json!({"id": 1}));
            })
            .run();
    }
}
