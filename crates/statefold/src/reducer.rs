use crate::action::Action;
use crate::error::Result;
use crate::state::State;
use std::fmt;
use std::rc::Rc;

type ReduceFn = dyn Fn(Option<State>, &Action) -> Result<Option<State>>;

/// Pure transition function `(state, action) -> state`.
///
/// `None` as input means the prior state is undefined; the reducer then
/// returns its initial state. `None` as output means "missing" and is a
/// contract violation for every live action. `State::Null` is a legal result.
///
/// ```
/// use statefold::{Reducer, State};
///
/// let counter = Reducer::new(|state, action| {
///     let count = state.and_then(|s| s.as_i64()).unwrap_or(0);
///     if action.is("INCREMENT") {
///         Some(State::from(count + 1))
///     } else {
///         Some(State::from(count))
///     }
/// });
/// # let _ = counter;
/// ```
#[derive(Clone)]
pub struct Reducer(Rc<ReduceFn>);

impl Reducer {
    /// Wrap an infallible reducer
    pub fn new<F>(reduce: F) -> Self
    where
        F: Fn(Option<State>, &Action) -> Option<State> + 'static,
    {
        Self(Rc::new(move |state: Option<State>, action: &Action| {
            Ok(reduce(state, action))
        }))
    }

    /// Wrap a reducer that can fail, e.g. one that delegates to other reducers
    pub fn fallible<F>(reduce: F) -> Self
    where
        F: Fn(Option<State>, &Action) -> Result<Option<State>> + 'static,
    {
        Self(Rc::new(reduce))
    }

    pub fn reduce(&self, state: Option<State>, action: &Action) -> Result<Option<State>> {
        (self.0)(state, action)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reducer(..)")
    }
}
