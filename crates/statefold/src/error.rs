//! Errors returned by the store, the reducer combinator and middleware

use thiserror::Error;

/// Every failure is returned synchronously to the immediate caller.
///
/// None of these are recovered internally: a failed dispatch leaves the
/// state exactly as it was and the store idle again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A required constructor argument was not provided
    #[error("Expected the {0} to be a function.")]
    Construction(String),

    /// The dispatched value is not a plain record or has no `type`
    #[error("{0}")]
    InvalidAction(String),

    /// `dispatch` was called while the store was reducing or notifying
    #[error("Reducers may not dispatch actions.")]
    Reentrancy,

    /// A reducer returned no state for a live action
    #[error("{}", reducer_contract_message(.key.as_deref(), .action_type))]
    ReducerContract {
        key: Option<String>,
        action_type: String,
    },

    /// A combined reducer failed its build-time probe
    #[error("{reason}")]
    ReducerShape { key: String, reason: String },

    /// A middleware refused or failed to handle an action, e.g.
    /// `ActionFilter::rejecting` in `statefold-middleware`. Application
    /// middleware returns it for its own failures.
    #[error("Middleware failed: {0}")]
    Middleware(String),
}

fn reducer_contract_message(key: Option<&str>, action_type: &str) -> String {
    match key {
        Some(key) => format!(
            "Given action \"{action_type}\", reducer \"{key}\" returned undefined. \
             To ignore an action, you must explicitly return the previous state. \
             If you want this reducer to hold no value, you can return null instead of undefined."
        ),
        None => format!(
            "Given action \"{action_type}\", the root reducer returned undefined. \
             To ignore an action, you must explicitly return the previous state."
        ),
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
