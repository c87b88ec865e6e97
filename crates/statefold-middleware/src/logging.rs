use serde_json::Value;
use statefold::{Dispatch, Middleware, MiddlewareApi, Result};
use std::collections::HashSet;

/// LoggingMiddleware - logs all actions passing through
///
/// Every action is logged at debug level before it is forwarded. Failed
/// dispatches are logged as warnings and still returned to the caller.
#[derive(Debug, Default)]
pub struct LoggingMiddleware {
    skip: HashSet<String>,
    log_state: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Don't log actions of this type (e.g. high frequency ticks)
    pub fn skip(mut self, action_type: impl Into<String>) -> Self {
        self.skip.insert(action_type.into());
        self
    }

    /// Also log the state after each action
    pub fn with_state(mut self, log_state: bool) -> Self {
        self.log_state = log_state;
        self
    }

    fn is_skipped(&self, action: &Value) -> bool {
        action
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| self.skip.contains(kind))
    }
}

impl Middleware for LoggingMiddleware {
    fn handle(&self, api: &MiddlewareApi, action: Value, next: &Dispatch) -> Result<Value> {
        if self.is_skipped(&action) {
            return next(action);
        }

        log::debug!("Action: {}", action);
        let result = next(action);
        match &result {
            Ok(_) if self.log_state => log::debug!("State: {}", api.get_state()),
            Ok(_) => {}
            Err(e) => log::warn!("Dispatch failed: {}", e),
        }
        result
    }
}
