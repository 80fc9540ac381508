//! # Resource Flow Runtime
//!
//! Runtime implementation for the Resource Flow architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect interpretation.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Interprets effect descriptions and feeds actions
//!   back to reducers
//! - **Action Broadcast**: Lets observers watch the feedback loop, which is
//!   how request/response flows are awaited
//!
//! ## Concurrency model
//!
//! The reducer itself is synchronous and runs under the state write lock, so
//! all reducer invocations serialize. Concurrency only exists in effect
//! execution, and even there it is declarative: `Effect::Parallel` children
//! are all started without waiting, `Effect::Sequential` children run one at
//! a time, each waiting for the prior to settle.
//!
//! ## Example
//!
//! ```ignore
//! use resource_flow_runtime::Store;
//!
//! let store = Store::new(resource.initial_state(), resource.reducer(), resource.environment());
//!
//! let handle = store.send(resource.request("/api/users", params, data)).await?;
//! handle.wait().await;
//!
//! let state = store.state(Clone::clone).await;
//! ```

use resource_flow_core::{Effect, Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown
        /// initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the action's effects
/// to complete.
///
/// # Example
///
/// ```ignore
/// let handle = store.send(action).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All effects from the action are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle
    ///
    /// # Returns
    ///
    /// A tuple of `(EffectHandle, EffectTracking)` where:
    /// - `EffectHandle` is returned to the caller for waiting
    /// - `EffectTracking` is used internally for effect execution
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all effects to complete
    ///
    /// Blocks until the effect counter reaches zero.
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            let _ = self.completion.changed().await;
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
///
/// This type is internal to the runtime and not exposed to users.
/// It carries the tracking state through effect execution.
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Fresh tracking context for a sequential sub-effect
    fn sub() -> (Self, watch::Receiver<()>) {
        let (tx, rx) = watch::channel(());
        (
            Self {
                counter: Arc::new(AtomicUsize::new(0)),
                notifier: Arc::new(tx),
            },
            rx,
        )
    }

    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Ensures the effect counter is always decremented, even if the effect
/// panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The Store - runtime coordinator for a reducer
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (transition logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop)
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let store = Store::new(
///     resource.initial_state(),
///     resource.reducer(),
///     resource.environment(),
/// );
///
/// store.send(resource.request("/api/users", params, data)).await?;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// All actions produced by effects (request outcomes, hook actions,
    /// futures) are broadcast to observers. This is how request-response
    /// flows are awaited without coupling to any transport.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            shutdown: Arc::clone(&self.shutdown),
            pending_effects: Arc::clone(&self.pending_effects),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Creates a Store with default configuration:
    /// - Action broadcast capacity: 16 (increase with
    ///   [`with_broadcast_capacity`](Self::with_broadcast_capacity))
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new Store with custom action broadcast capacity
    ///
    /// Increase the capacity when observers (e.g. `send_and_wait_for`
    /// callers) may lag behind a bursty feedback loop.
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            action_broadcast,
        }
    }

    /// Send an action to the store
    ///
    /// This is the primary way to interact with the store:
    /// 1. Acquires write lock on state
    /// 2. Calls reducer with (state, action, environment)
    /// 3. Executes returned effects asynchronously
    /// 4. Effects may produce more actions (feedback loop)
    ///
    /// # Concurrency and Effect Execution
    ///
    /// - The reducer executes synchronously while holding a write lock
    /// - Effects execute asynchronously in spawned tasks
    /// - `send()` returns after starting effect execution, not completion
    /// - Multiple concurrent `send()` calls serialize at the reducer level
    ///
    /// # Returns
    ///
    /// An [`EffectHandle`] that can be used to wait for effect completion.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting
    /// down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        // Check if store is shutting down
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        tracing::debug!("Processing action");
        metrics::counter!("store.actions.total").increment(1);

        // Create tracking for this action
        let (handle, tracking) = EffectHandle::new();

        let effects = {
            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            let duration = start.elapsed();
            metrics::histogram!("store.reducer.duration_seconds").record(duration.as_secs_f64());

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            effects
        };

        // Execute effects with tracking
        for effect in effects {
            self.execute_effect(effect, tracking.clone());
        }
        tracing::debug!("Action processing completed, returning handle");

        Ok(handle)
    }

    /// Send an action and wait for a matching result action
    ///
    /// This method is designed for request-response patterns. It subscribes
    /// to the action broadcast, sends the initial action, then waits for an
    /// action matching the predicate.
    ///
    /// The subscription happens BEFORE sending, so a fast effect cannot
    /// settle unobserved.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: Timeout expired before matching action
    ///   received
    /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
    ///
    /// # Example
    ///
    /// ```ignore
    /// let settled = store.send_and_wait_for(
    ///     resource.request("/api/users", params, data),
    ///     |a| matches!(a, ResourceAction::Received { .. } | ResourceAction::Failed { .. }),
    ///     Duration::from_secs(10),
    /// ).await?;
    /// ```
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut receiver = self.action_broadcast.subscribe();
        self.send(action).await?;

        tokio::time::timeout(timeout, async move {
            loop {
                match receiver.recv().await {
                    Ok(candidate) if predicate(&candidate) => return Ok(candidate),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged behind the broadcast");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to actions produced by effects
    ///
    /// Every action fed back into the store by an effect is also broadcast
    /// to subscribers, in feedback order.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Read current state via a closure
    ///
    /// Access state through a closure to ensure the lock is released
    /// promptly:
    ///
    /// ```ignore
    /// let stage = store.state(|s| s.promise_state).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Initiate graceful shutdown of the store
    ///
    /// This method:
    /// 1. Sets the shutdown flag (rejecting new actions)
    /// 2. Waits for pending effects to complete (with timeout)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
    /// all pending effects complete.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        metrics::counter!("store.shutdown.initiated").increment(1);

        self.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(100);

        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(pending_effects = pending, "Shutdown timeout");
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Feed an effect-produced action back into the store
    ///
    /// Applies the action first, then broadcasts it, so an observer that
    /// matches an action reads state already reflecting it. A send rejection
    /// (store shutting down) drops the action unbroadcast: feedback is
    /// fire-and-forget.
    async fn feed_back(&self, action: A) {
        match self.send(action.clone()).await {
            Ok(_handle) => {
                let _ = self.action_broadcast.send(action);
            },
            Err(error) => {
                tracing::debug!(%error, "Dropped feedback action");
            },
        }
    }

    /// Execute an effect with tracking
    ///
    /// # Effect Types
    ///
    /// - `None`: No-op
    /// - `Action`: Feeds the action straight back into the store
    /// - `Future`: Executes async computation, feeds back resulting action
    ///   if `Some`
    /// - `Request`: Invokes the request handler, feeds the mapped outcome
    ///   action back
    /// - `Parallel`: Executes effects concurrently
    /// - `Sequential`: Executes effects in order, waiting for each to
    ///   complete
    ///
    /// # Error Handling Strategy
    ///
    /// Effects are fire-and-forget: a panicking effect task is logged by the
    /// runtime and other effects continue. The [`DecrementGuard`] ensures
    /// counters are updated even on panic.
    #[tracing::instrument(skip(self, effect, tracking), name = "execute_effect")]
    fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Action(action) => {
                tracing::trace!("Executing Effect::Action");
                metrics::counter!("store.effects.executed", "type" => "action").increment(1);
                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let tracking_clone = tracking.clone();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking_clone);
                    let _pending_guard = pending_guard; // Decrement on drop

                    store.feed_back(*action).await;
                });
            },
            Effect::Future(fut) => {
                tracing::trace!("Executing Effect::Future");
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let tracking_clone = tracking.clone();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking_clone);
                    let _pending_guard = pending_guard; // Decrement on drop

                    if let Some(action) = fut.await {
                        tracing::trace!("Effect::Future produced an action, feeding back");
                        store.feed_back(action).await;
                    } else {
                        tracing::trace!("Effect::Future completed with no action");
                    }
                });
            },
            Effect::Request(command) => {
                tracing::trace!(url = command.url(), "Executing Effect::Request");
                metrics::counter!("store.effects.executed", "type" => "request").increment(1);
                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let tracking_clone = tracking.clone();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking_clone);
                    let _pending_guard = pending_guard; // Decrement on drop

                    let start = std::time::Instant::now();
                    let action = command.run().await;
                    metrics::histogram!("store.request.duration_seconds")
                        .record(start.elapsed().as_secs_f64());

                    store.feed_back(action).await;
                });
            },
            Effect::Parallel(effects) => {
                tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                // All children start immediately, sharing the same tracking
                for effect in effects {
                    self.execute_effect(effect, tracking.clone());
                }
            },
            Effect::Sequential(effects) => {
                let effect_count = effects.len();
                tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);

                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let tracking_clone = tracking.clone();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking_clone);
                    let _pending_guard = pending_guard; // Decrement on drop

                    // Execute effects one by one, waiting for each to settle
                    for (idx, effect) in effects.into_iter().enumerate() {
                        tracing::trace!(
                            "Executing sequential effect {} of {}",
                            idx + 1,
                            effect_count
                        );

                        let (sub_tracking, mut sub_rx) = EffectTracking::sub();
                        store.execute_effect(effect, sub_tracking.clone());

                        if sub_tracking.counter.load(Ordering::SeqCst) > 0 {
                            let _ = sub_rx.changed().await;
                        }
                    }
                    tracing::trace!("Effect::Sequential completed");
                });
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use resource_flow_core::{SmallVec, smallvec};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Ping,
        Pong,
        Record(u32),
    }

    #[derive(Debug, Clone, Default)]
    struct TestState {
        pings: u32,
        recorded: Vec<u32>,
    }

    #[derive(Clone)]
    struct TestEnvironment;

    #[derive(Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnvironment;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Ping => {
                    state.pings += 1;
                    smallvec![Effect::Action(Box::new(TestAction::Pong))]
                },
                TestAction::Pong => smallvec![Effect::None],
                TestAction::Record(value) => {
                    state.recorded.push(value);
                    smallvec![Effect::None]
                },
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
        Store::new(TestState::default(), TestReducer, TestEnvironment)
    }

    #[tokio::test]
    async fn test_send_runs_reducer_and_effects() {
        let store = store();

        let mut handle = store.send(TestAction::Ping).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.pings).await, 1);
    }

    #[tokio::test]
    async fn test_action_effects_are_broadcast() {
        let store = store();
        let mut observer = store.subscribe();

        store.send(TestAction::Ping).await.unwrap();

        let observed = tokio::time::timeout(Duration::from_secs(1), observer.recv())
            .await
            .expect("broadcast should arrive")
            .unwrap();
        assert_eq!(observed, TestAction::Pong);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_matches_feedback() {
        let store = store();

        let settled = store
            .send_and_wait_for(
                TestAction::Ping,
                |a| matches!(a, TestAction::Pong),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(settled, TestAction::Pong);
    }

    #[tokio::test]
    async fn test_sequential_effects_preserve_order() {
        // A reducer-free check of the executor: three slow futures wrapped
        // Sequential must feed back in list order.
        let order = Arc::new(Mutex::new(Vec::new()));

        #[derive(Clone)]
        struct SeqReducer(Arc<Mutex<Vec<u32>>>);

        impl Reducer for SeqReducer {
            type State = TestState;
            type Action = TestAction;
            type Environment = TestEnvironment;

            fn reduce(
                &self,
                state: &mut Self::State,
                action: Self::Action,
                _env: &Self::Environment,
            ) -> SmallVec<[Effect<Self::Action>; 4]> {
                match action {
                    TestAction::Ping => smallvec![Effect::Sequential(vec![
                        Effect::Future(Box::pin(async {
                            tokio::time::sleep(Duration::from_millis(30)).await;
                            Some(TestAction::Record(1))
                        })),
                        Effect::Future(Box::pin(async {
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            Some(TestAction::Record(2))
                        })),
                        Effect::Action(Box::new(TestAction::Record(3))),
                    ])],
                    TestAction::Record(value) => {
                        state.recorded.push(value);
                        self.0.lock().unwrap().push(value);
                        smallvec![Effect::None]
                    },
                    TestAction::Pong => smallvec![Effect::None],
                }
            }
        }

        let store = Store::new(
            TestState::default(),
            SeqReducer(Arc::clone(&order)),
            TestEnvironment,
        );

        store
            .send_and_wait_for(
                TestAction::Ping,
                |a| matches!(a, TestAction::Record(3)),
                Duration::from_secs(2),
            )
            .await
            .unwrap();

        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_actions() {
        let store = store();

        store.shutdown(Duration::from_secs(1)).await.unwrap();

        assert!(matches!(
            store.send(TestAction::Ping).await,
            Err(StoreError::ShutdownInProgress)
        ));
    }
}
