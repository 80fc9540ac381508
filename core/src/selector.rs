//! Memoized read accessors over the enclosing application state.
//!
//! A selector is a read-only projection from the application's state tree to
//! one resource's slice. [`MemoSelector`] memoizes on the projected input:
//! as long as the slice compares equal to the last one seen, the cached
//! output is returned without re-running the transform.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A last-value-memoized selector.
///
/// # Type Parameters
///
/// - `S`: The enclosing application state
/// - `I`: The projected input the cache is keyed by (`PartialEq`)
/// - `O`: The selector's output
///
/// # Example
///
/// ```
/// use resource_flow_core::selector::MemoSelector;
///
/// struct AppState {
///     users: Vec<String>,
/// }
///
/// let names = MemoSelector::new(
///     |state: &AppState| state.users.clone(),
///     |users: &Vec<String>| users.join(", "),
/// );
///
/// let state = AppState { users: vec!["ada".into(), "grace".into()] };
/// assert_eq!(names.select(&state), "ada, grace");
/// assert_eq!(names.select(&state), "ada, grace");
/// assert_eq!(names.recomputations(), 1);
/// ```
pub struct MemoSelector<S, I, O> {
    input: Box<dyn Fn(&S) -> I + Send + Sync>,
    output: Box<dyn Fn(&I) -> O + Send + Sync>,
    cache: Mutex<Option<(I, O)>>,
    recomputations: AtomicUsize,
}

impl<S, I, O> MemoSelector<S, I, O>
where
    I: PartialEq,
    O: Clone,
{
    /// Create a selector from an input projection and an output transform.
    ///
    /// `input` extracts the cache key from the application state; `output`
    /// runs only when the key differs from the previously seen one.
    #[must_use]
    pub fn new(
        input: impl Fn(&S) -> I + Send + Sync + 'static,
        output: impl Fn(&I) -> O + Send + Sync + 'static,
    ) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            cache: Mutex::new(None),
            recomputations: AtomicUsize::new(0),
        }
    }

    /// Read from the application state, reusing the cached output when the
    /// projected input is unchanged
    pub fn select(&self, state: &S) -> O {
        let input = (self.input)(state);

        let mut cache = self.cache.lock();
        if let Some((cached_input, cached_output)) = cache.as_ref() {
            if *cached_input == input {
                return cached_output.clone();
            }
        }

        let output = (self.output)(&input);
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        *cache = Some((input, output.clone()));
        output
    }

    /// How many times the output transform has actually run.
    ///
    /// Useful in tests to assert memoization behavior.
    #[must_use]
    pub fn recomputations(&self) -> usize {
        self.recomputations.load(Ordering::Relaxed)
    }
}

impl<S, I, O> std::fmt::Debug for MemoSelector<S, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoSelector")
            .field(
                "recomputations",
                &self.recomputations.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}
