use serde_json::Value;
use statefold::{Dispatch, Middleware, MiddlewareApi, Result, StoreError};

type Predicate = Box<dyn Fn(&Value) -> bool>;

/// Stops actions whose type matches a predicate
///
/// A blocked action never reaches the reducer and listeners are not
/// notified. By default it is swallowed and the action itself is returned
/// to the caller; a [`rejecting`](ActionFilter::rejecting) filter returns
/// `StoreError::Middleware` instead.
pub struct ActionFilter {
    blocked: Predicate,
    reject: bool,
}

impl ActionFilter {
    /// Block every action whose `type` satisfies `blocked`
    pub fn new(blocked: impl Fn(&Value) -> bool + 'static) -> Self {
        Self {
            blocked: Box::new(blocked),
            reject: false,
        }
    }

    /// Fail blocked dispatches instead of swallowing them
    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    /// Block a fixed set of string types
    pub fn types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: Vec<String> = types.into_iter().map(Into::into).collect();
        Self::new(move |kind| kind.as_str().is_some_and(|kind| types.iter().any(|t| t == kind)))
    }
}

impl Middleware for ActionFilter {
    fn handle(&self, _api: &MiddlewareApi, action: Value, next: &Dispatch) -> Result<Value> {
        let blocked = action.get("type").is_some_and(|kind| (self.blocked)(kind));
        if blocked {
            if self.reject {
                log::debug!("ActionFilter: rejected {}", action);
                return Err(StoreError::Middleware(format!(
                    "action type {} is blocked",
                    action["type"]
                )));
            }
            log::debug!("ActionFilter: swallowed {}", action);
            return Ok(action);
        }
        next(action)
    }
}
