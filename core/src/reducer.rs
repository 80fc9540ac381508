//! The core trait for state-transition logic.
//!
//! Reducers are pure functions:
//! `(State, Action, Environment) → (State, Effects)`
//!
//! They contain all transition logic and are deterministic and testable.
//! Anything that touches the outside world is returned as an
//! [`Effect`] value and interpreted elsewhere.

use crate::effect::Effect;
use smallvec::SmallVec;

/// The Reducer trait - core abstraction for state-transition logic
///
/// # Type Parameters
///
/// - `State`: The state this reducer operates on
/// - `Action`: The action type this reducer processes
/// - `Environment`: The injected dependencies this reducer needs
///
/// # Example
///
/// ```ignore
/// impl Reducer for ResourceReducer {
///     type State = ResourceState;
///     type Action = ResourceAction;
///     type Environment = ResourceEnvironment;
///
///     fn reduce(
///         &self,
///         state: &mut ResourceState,
///         action: ResourceAction,
///         env: &ResourceEnvironment,
///     ) -> SmallVec<[Effect<ResourceAction>; 4]> {
///         match action {
///             ResourceAction::Reset => {
///                 *state = self.initial_state.clone();
///                 smallvec![Effect::None]
///             }
///             _ => smallvec![Effect::None],
///         }
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Reduce an action into state changes and effects
    ///
    /// This is a pure function that:
    /// 1. Inspects the action
    /// 2. Updates state in place
    /// 3. Returns effect descriptions to be executed
    ///
    /// # Arguments
    ///
    /// - `state`: Mutable reference to current state
    /// - `action`: The action to process
    /// - `env`: Reference to injected dependencies
    ///
    /// # Returns
    ///
    /// A vector of effects to be executed by the runtime
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]>;
}
