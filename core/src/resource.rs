//! The resource lifecycle factory.
//!
//! [`Resource::new`] turns a [`ResourceConfig`] into the conventional state
//! management artifacts for one resource of asynchronous request/response
//! data: action constructors, a pure reducer implementing the four-state
//! lifecycle machine, and a memoized selector.
//!
//! # The lifecycle machine
//!
//! `promise_state` is always exactly one of `Init`, `Pending`, `Resolved`,
//! `Rejected`:
//!
//! | Current | Action | Next | Scheduled effects |
//! |---|---|---|---|
//! | any | `Requested` | `Pending` | request command, then one action per `requested` hook |
//! | any | `Received` | `Resolved` | `received` hook list |
//! | any | `Failed` | `Rejected` | `rejected` hook list |
//! | any | `Reset` | copy of the initial state | none |
//! | any | `Update`/`Delete` | handler-defined | handler-returned effects |
//!
//! The machine does not enforce predecessor states: a `Received` or `Failed`
//! action is processed identically whether or not a request is currently
//! pending. Callers that need stricter sequencing must arrange it at the
//! dispatch site.

use crate::effect::{Effect, RequestCommand};
use crate::reducer::Reducer;
use crate::request::{HttpResponse, RequestError, RequestHandler};
use crate::selector::MemoSelector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;
use thiserror::Error;

/// Where a resource sits in its current request cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PromiseState {
    /// No request has been dispatched yet (or the resource was reset)
    #[default]
    Init,

    /// A request has been dispatched and has not settled
    Pending,

    /// The last request settled successfully
    Resolved,

    /// The last request settled with a failure
    Rejected,
}

impl std::fmt::Display for PromiseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "INIT"),
            Self::Pending => write!(f, "PENDING"),
            Self::Resolved => write!(f, "RESOLVED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// The state slice owned by one resource's reducer.
///
/// The metadata fields (`headers`, `status_text`, `status`) are `None` until
/// at least one request has settled; they then carry the last settled
/// response's metadata, success or failure alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    /// The last successfully received payload, after transformation
    pub data: Value,

    /// Current lifecycle stage
    pub promise_state: PromiseState,

    /// Header pairs from the last settled response
    pub headers: Option<Vec<(String, String)>>,

    /// Reason phrase from the last settled response
    pub status_text: Option<String>,

    /// Status code from the last settled response
    pub status: Option<u16>,
}

impl Default for ResourceState {
    fn default() -> Self {
        Self {
            data: Value::Object(serde_json::Map::new()),
            promise_state: PromiseState::Init,
            headers: None,
            status_text: None,
            status: None,
        }
    }
}

impl ResourceState {
    fn stash_metadata(&mut self, response: &HttpResponse) {
        self.headers = Some(response.headers.clone());
        self.status_text = Some(response.status_text.clone());
        self.status = Some(response.status);
    }
}

/// All possible inputs to a resource reducer.
///
/// The action *kind* is the variant; string-keyed dispatch has no place in
/// a tagged union, so the resource's `action_prefix` only matters at the
/// wire boundary (see [`crate::wire`]).
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceAction {
    /// Start a request cycle. Carries everything the scheduled request
    /// command needs; dispatching this action performs no I/O by itself.
    Requested {
        /// Target location, forwarded verbatim to the request handler
        url: String,
        /// Query-like parameters for the handler
        params: Value,
        /// Body-like payload for the handler
        data: Value,
        /// Opaque extra payload for hook actions and observers
        extra_payload: Value,
    },

    /// Internal: the scheduled request settled successfully
    Received {
        /// The success response
        success_response: HttpResponse,
        /// The `Requested` action that started this cycle
        root_action: Box<ResourceAction>,
    },

    /// Internal: the scheduled request settled with a failure
    Failed {
        /// The failure outcome, wrapping a response
        error: RequestError,
        /// The `Requested` action that started this cycle
        root_action: Box<ResourceAction>,
    },

    /// Restore the configured initial state
    Reset,

    /// Delegated to the configured update handler
    Update {
        /// Handler-defined payload
        payload: Value,
    },

    /// Delegated to the configured delete handler
    Delete {
        /// Handler-defined payload
        payload: Value,
    },
}

/// A supplementary action-producing function attached to a lifecycle stage.
///
/// Each hook receives the action that triggered the stage (the root
/// `Requested` action, or the settling `Received`/`Failed` action) and
/// produces one outbound action to dispatch.
pub type HookAction = Arc<dyn Fn(&ResourceAction) -> ResourceAction + Send + Sync>;

/// Execution options for a hook list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookOptions {
    /// When `true`, the runtime dispatches the stage's effects one at a
    /// time, each waiting for the prior to settle. When `false` (default),
    /// all are fired without waiting.
    pub sequence: bool,
}

/// An ordered list of supplementary actions for one lifecycle stage.
#[derive(Clone, Default)]
pub struct HookList {
    /// Hook functions, dispatched in list order
    pub actions: Vec<HookAction>,

    /// Sequential or concurrent execution of the stage's effects
    pub options: HookOptions,
}

impl HookList {
    /// Create an empty hook list with default (concurrent) options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook function
    #[must_use]
    pub fn with_action(
        mut self,
        action: impl Fn(&ResourceAction) -> ResourceAction + Send + Sync + 'static,
    ) -> Self {
        self.actions.push(Arc::new(action));
        self
    }

    /// Request sequential execution for this stage
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.options.sequence = true;
        self
    }
}

impl std::fmt::Debug for HookList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookList")
            .field("actions", &self.actions.len())
            .field("options", &self.options)
            .finish()
    }
}

/// Pure function mapping a raw response payload to the stored `data` value.
pub type DataTransformer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// An externally supplied reducer branch for non-lifecycle mutations.
///
/// Receives the current state and the action's payload; returns the effects
/// to schedule. The lifecycle machine delegates `Update`/`Delete` actions
/// here entirely.
pub type MutationHandler =
    Arc<dyn Fn(&mut ResourceState, &Value) -> SmallVec<[Effect<ResourceAction>; 4]> + Send + Sync>;

/// Errors detected when a [`Resource`] is constructed.
///
/// Misconfiguration surfaces at the factory call rather than on first
/// dispatch, so a misconfigured resource cannot be mounted at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The action prefix was empty
    #[error("action prefix must not be empty")]
    EmptyActionPrefix,

    /// The store name was empty
    #[error("store name must not be empty (resource {action_prefix})")]
    EmptyStoreName {
        /// Prefix of the offending resource
        action_prefix: String,
    },

    /// No request handler was supplied
    #[error("resource {action_prefix} has no request handler")]
    MissingRequestHandler {
        /// Prefix of the offending resource
        action_prefix: String,
    },
}

/// Declarative configuration for one resource.
///
/// `action_prefix` and `store_name` are fixed at construction; everything
/// else has a default and is set through the `with_*` builders.
#[derive(Clone)]
pub struct ResourceConfig {
    action_prefix: String,
    store_name: String,
    request_handler: Option<Arc<dyn RequestHandler>>,
    requested: HookList,
    received: HookList,
    rejected: HookList,
    received_data_transformer: DataTransformer,
    initial_state: ResourceState,
    update_handler: Option<MutationHandler>,
    delete_handler: Option<MutationHandler>,
}

impl ResourceConfig {
    /// Create a configuration with the resource's identifying names.
    ///
    /// Defaults: no hooks, identity data transformer,
    /// [`ResourceState::default`] initial state, no update/delete handlers.
    #[must_use]
    pub fn new(action_prefix: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            action_prefix: action_prefix.into(),
            store_name: store_name.into(),
            request_handler: None,
            requested: HookList::default(),
            received: HookList::default(),
            rejected: HookList::default(),
            received_data_transformer: Arc::new(|data| data),
            initial_state: ResourceState::default(),
            update_handler: None,
            delete_handler: None,
        }
    }

    /// Set the request-performing capability (required)
    #[must_use]
    pub fn with_request_handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.request_handler = Some(handler);
        self
    }

    /// Set the hook list dispatched alongside the request command
    #[must_use]
    pub fn with_requested_hooks(mut self, hooks: HookList) -> Self {
        self.requested = hooks;
        self
    }

    /// Set the hook list dispatched when a request resolves
    #[must_use]
    pub fn with_received_hooks(mut self, hooks: HookList) -> Self {
        self.received = hooks;
        self
    }

    /// Set the hook list dispatched when a request is rejected
    #[must_use]
    pub fn with_rejected_hooks(mut self, hooks: HookList) -> Self {
        self.rejected = hooks;
        self
    }

    /// Set the pure function shaping received payloads before storage
    #[must_use]
    pub fn with_received_data_transformer(
        mut self,
        transformer: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.received_data_transformer = Arc::new(transformer);
        self
    }

    /// Set the state shape before any request and after reset/failure
    #[must_use]
    pub fn with_initial_state(mut self, initial_state: ResourceState) -> Self {
        self.initial_state = initial_state;
        self
    }

    /// Enable the `Update` action with an externally supplied reducer branch
    #[must_use]
    pub fn with_update_handler(
        mut self,
        handler: impl Fn(&mut ResourceState, &Value) -> SmallVec<[Effect<ResourceAction>; 4]>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.update_handler = Some(Arc::new(handler));
        self
    }

    /// Enable the `Delete` action with an externally supplied reducer branch
    #[must_use]
    pub fn with_delete_handler(
        mut self,
        handler: impl Fn(&mut ResourceState, &Value) -> SmallVec<[Effect<ResourceAction>; 4]>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.delete_handler = Some(Arc::new(handler));
        self
    }
}

impl std::fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("action_prefix", &self.action_prefix)
            .field("store_name", &self.store_name)
            .field("has_request_handler", &self.request_handler.is_some())
            .field("requested", &self.requested)
            .field("received", &self.received)
            .field("rejected", &self.rejected)
            .field("has_update_handler", &self.update_handler.is_some())
            .field("has_delete_handler", &self.delete_handler.is_some())
            .finish_non_exhaustive()
    }
}

/// Injected dependencies for a [`ResourceReducer`].
#[derive(Clone)]
pub struct ResourceEnvironment {
    /// The capability that performs the actual requests
    pub request_handler: Arc<dyn RequestHandler>,
}

impl ResourceEnvironment {
    /// Create an environment around a request handler
    #[must_use]
    pub fn new(request_handler: Arc<dyn RequestHandler>) -> Self {
        Self { request_handler }
    }
}

impl std::fmt::Debug for ResourceEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceEnvironment").finish_non_exhaustive()
    }
}

/// The state management artifacts for one resource.
///
/// Built by [`Resource::new`] from a [`ResourceConfig`]. The action
/// constructors are pure; dispatching their output through a store drives
/// the lifecycle machine.
pub struct Resource {
    action_prefix: String,
    store_name: String,
    initial_state: ResourceState,
    reducer: ResourceReducer,
    environment: ResourceEnvironment,
    update_enabled: bool,
    delete_enabled: bool,
}

impl Resource {
    /// The factory: validate the configuration and build the artifacts.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyActionPrefix`] / [`ConfigError::EmptyStoreName`]
    ///   when an identifying name is empty
    /// - [`ConfigError::MissingRequestHandler`] when no handler was supplied
    pub fn new(config: ResourceConfig) -> Result<Self, ConfigError> {
        if config.action_prefix.is_empty() {
            return Err(ConfigError::EmptyActionPrefix);
        }
        if config.store_name.is_empty() {
            return Err(ConfigError::EmptyStoreName {
                action_prefix: config.action_prefix,
            });
        }
        let Some(request_handler) = config.request_handler else {
            return Err(ConfigError::MissingRequestHandler {
                action_prefix: config.action_prefix,
            });
        };

        let update_enabled = config.update_handler.is_some();
        let delete_enabled = config.delete_handler.is_some();

        let reducer = ResourceReducer {
            action_prefix: config.action_prefix.clone(),
            requested: config.requested,
            received: config.received,
            rejected: config.rejected,
            received_data_transformer: config.received_data_transformer,
            initial_state: config.initial_state.clone(),
            update_handler: config.update_handler,
            delete_handler: config.delete_handler,
        };

        Ok(Self {
            action_prefix: config.action_prefix,
            store_name: config.store_name,
            initial_state: config.initial_state,
            reducer,
            environment: ResourceEnvironment::new(request_handler),
            update_enabled,
            delete_enabled,
        })
    }

    /// Build a `Requested` action with empty extra payload.
    ///
    /// Pure: no side effects at call time. The action carries everything the
    /// reducer needs to schedule the request command later.
    #[must_use]
    pub fn request(&self, url: impl Into<String>, params: Value, data: Value) -> ResourceAction {
        self.request_with_extra(url, params, data, Value::Object(serde_json::Map::new()))
    }

    /// Build a `Requested` action carrying an opaque extra payload
    #[must_use]
    pub fn request_with_extra(
        &self,
        url: impl Into<String>,
        params: Value,
        data: Value,
        extra_payload: Value,
    ) -> ResourceAction {
        ResourceAction::Requested {
            url: url.into(),
            params,
            data,
            extra_payload,
        }
    }

    /// Build a `Reset` action
    #[must_use]
    pub const fn reset(&self) -> ResourceAction {
        ResourceAction::Reset
    }

    /// Build an `Update` action, or `None` when no update handler was
    /// configured. Presence is decided once, at construction.
    #[must_use]
    pub fn update(&self, payload: Value) -> Option<ResourceAction> {
        self.update_enabled
            .then_some(ResourceAction::Update { payload })
    }

    /// Build a `Delete` action, or `None` when no delete handler was
    /// configured
    #[must_use]
    pub fn delete(&self, payload: Value) -> Option<ResourceAction> {
        self.delete_enabled
            .then_some(ResourceAction::Delete { payload })
    }

    /// The reducer implementing the lifecycle machine
    #[must_use]
    pub fn reducer(&self) -> ResourceReducer {
        self.reducer.clone()
    }

    /// The environment the reducer runs against
    #[must_use]
    pub fn environment(&self) -> ResourceEnvironment {
        self.environment.clone()
    }

    /// The configured initial state
    #[must_use]
    pub fn initial_state(&self) -> ResourceState {
        self.initial_state.clone()
    }

    /// The action namespace for the wire boundary
    #[must_use]
    pub fn action_prefix(&self) -> &str {
        &self.action_prefix
    }

    /// The key under which this resource's slice lives in the enclosing
    /// application state
    #[must_use]
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Build the default memoized selector over the enclosing state.
    ///
    /// `slice` projects the application state to this resource's slice; the
    /// selector shallow-clones it and memoizes on slice equality, so repeated
    /// reads of an unchanged slice return the cached copy.
    #[must_use]
    pub fn selector<GS>(
        &self,
        slice: impl Fn(&GS) -> &ResourceState + Send + Sync + 'static,
    ) -> MemoSelector<GS, ResourceState, ResourceState> {
        self.selector_with(slice, Clone::clone)
    }

    /// Build a memoized selector with a caller-supplied output transform.
    ///
    /// Like [`selector`](Self::selector), but instead of returning the slice
    /// itself the selector runs `output` over it. Memoization is still keyed
    /// on slice equality, so `output` runs only when the slice changes.
    #[must_use]
    pub fn selector_with<GS, O>(
        &self,
        slice: impl Fn(&GS) -> &ResourceState + Send + Sync + 'static,
        output: impl Fn(&ResourceState) -> O + Send + Sync + 'static,
    ) -> MemoSelector<GS, ResourceState, O>
    where
        O: Clone,
    {
        MemoSelector::new(move |state: &GS| slice(state).clone(), output)
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("action_prefix", &self.action_prefix)
            .field("store_name", &self.store_name)
            .field("update_enabled", &self.update_enabled)
            .field("delete_enabled", &self.delete_enabled)
            .finish_non_exhaustive()
    }
}

/// Reducer for one resource's lifecycle machine.
///
/// Cloneable so a store can own one while the [`Resource`] keeps another.
#[derive(Clone)]
pub struct ResourceReducer {
    action_prefix: String,
    requested: HookList,
    received: HookList,
    rejected: HookList,
    received_data_transformer: DataTransformer,
    initial_state: ResourceState,
    update_handler: Option<MutationHandler>,
    delete_handler: Option<MutationHandler>,
}

impl ResourceReducer {
    /// Map a hook list over the triggering action, one effect per hook
    fn hook_actions(list: &HookList, trigger: &ResourceAction) -> Vec<Effect<ResourceAction>> {
        list.actions
            .iter()
            .map(|hook| Effect::Action(Box::new(hook(trigger))))
            .collect()
    }

    /// Wrap a stage's effects per its sequence option
    fn staged(effects: Vec<Effect<ResourceAction>>, options: HookOptions) -> Effect<ResourceAction> {
        if options.sequence {
            Effect::Sequential(effects)
        } else {
            Effect::Parallel(effects)
        }
    }

    /// Effects for a settling stage: just the hook list, or a no-op
    fn settle_effects(
        list: &HookList,
        trigger: &ResourceAction,
    ) -> SmallVec<[Effect<ResourceAction>; 4]> {
        if list.actions.is_empty() {
            smallvec![Effect::None]
        } else {
            smallvec![Self::staged(Self::hook_actions(list, trigger), list.options)]
        }
    }

    fn handle_requested(
        &self,
        state: &mut ResourceState,
        root: &ResourceAction,
        env: &ResourceEnvironment,
    ) -> SmallVec<[Effect<ResourceAction>; 4]> {
        let ResourceAction::Requested {
            url, params, data, ..
        } = root
        else {
            return smallvec![Effect::None];
        };

        tracing::debug!(
            prefix = %self.action_prefix,
            url = %url,
            from = %state.promise_state,
            "request dispatched"
        );
        state.promise_state = PromiseState::Pending;

        let success_root = root.clone();
        let failure_root = root.clone();
        let command = RequestCommand::new(
            Arc::clone(&env.request_handler),
            url.clone(),
            params.clone(),
            data.clone(),
            move |success_response| ResourceAction::Received {
                success_response,
                root_action: Box::new(success_root),
            },
            move |error| ResourceAction::Failed {
                error,
                root_action: Box::new(failure_root),
            },
        );

        // Main command first, hooks in list order.
        let mut scheduled = vec![Effect::Request(command)];
        scheduled.extend(Self::hook_actions(&self.requested, root));

        smallvec![Self::staged(scheduled, self.requested.options)]
    }

    fn handle_received(
        &self,
        state: &mut ResourceState,
        action: &ResourceAction,
    ) -> SmallVec<[Effect<ResourceAction>; 4]> {
        let ResourceAction::Received {
            success_response, ..
        } = action
        else {
            return smallvec![Effect::None];
        };

        tracing::debug!(
            prefix = %self.action_prefix,
            status = success_response.status,
            from = %state.promise_state,
            "request resolved"
        );
        state.data = (self.received_data_transformer)(success_response.data.clone());
        state.stash_metadata(success_response);
        state.promise_state = PromiseState::Resolved;

        Self::settle_effects(&self.received, action)
    }

    fn handle_failed(
        &self,
        state: &mut ResourceState,
        action: &ResourceAction,
    ) -> SmallVec<[Effect<ResourceAction>; 4]> {
        let ResourceAction::Failed { error, .. } = action else {
            return smallvec![Effect::None];
        };

        tracing::debug!(
            prefix = %self.action_prefix,
            status = error.response.status,
            from = %state.promise_state,
            "request rejected"
        );
        // Failure metadata is stashed first, then the initial data is
        // restored; the metadata itself survives for diagnostics.
        state.stash_metadata(&error.response);
        state.data = self.initial_state.data.clone();
        state.promise_state = PromiseState::Rejected;

        Self::settle_effects(&self.rejected, action)
    }

    fn handle_mutation(
        &self,
        state: &mut ResourceState,
        handler: Option<&MutationHandler>,
        payload: &Value,
        kind: &str,
    ) -> SmallVec<[Effect<ResourceAction>; 4]> {
        match handler {
            Some(handler) => handler(state, payload),
            None => {
                tracing::warn!(
                    prefix = %self.action_prefix,
                    kind,
                    "mutation action without a configured handler, ignoring"
                );
                smallvec![Effect::None]
            },
        }
    }
}

impl std::fmt::Debug for ResourceReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceReducer")
            .field("action_prefix", &self.action_prefix)
            .field("requested", &self.requested)
            .field("received", &self.received)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

impl Reducer for ResourceReducer {
    type State = ResourceState;
    type Action = ResourceAction;
    type Environment = ResourceEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match &action {
            ResourceAction::Requested { .. } => self.handle_requested(state, &action, env),
            ResourceAction::Received { .. } => self.handle_received(state, &action),
            ResourceAction::Failed { .. } => self.handle_failed(state, &action),
            ResourceAction::Reset => {
                tracing::debug!(prefix = %self.action_prefix, "reset");
                *state = self.initial_state.clone();
                smallvec![Effect::None]
            },
            ResourceAction::Update { payload } => {
                self.handle_mutation(state, self.update_handler.as_ref(), payload, "update")
            },
            ResourceAction::Delete { payload } => {
                self.handle_mutation(state, self.delete_handler.as_ref(), payload, "delete")
            },
        }
    }
}
