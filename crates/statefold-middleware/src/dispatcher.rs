//! Deferred dispatch
//!
//! A store rejects `dispatch` calls made while it is reducing or notifying
//! listeners. When a listener needs to react with another action it uses the
//! [`Dispatcher`] instead: the action is queued and re-enters the full
//! middleware chain once the current dispatch has finished.
//!
//! This enables patterns like:
//! - a listener noticing `LOGGED_IN` and requesting `LOAD_PROFILE`
//! - follow-up actions that must observe the state of the action before them

use serde_json::Value;
use statefold::{Dispatch, Middleware, MiddlewareApi, Result, Store};
use std::cell::Cell;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Queues actions for later dispatch
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    action_tx: Sender<Value>,
}

impl Dispatcher {
    /// Queue an action
    ///
    /// The action is dispatched, through the whole middleware chain, after
    /// the dispatch currently in progress returns.
    pub fn dispatch(&self, action: impl Into<Value>) {
        if let Err(e) = self.action_tx.send(action.into()) {
            log::error!("Dispatcher: failed to queue action: {}", e);
        }
    }
}

/// Receiving side of a [`Dispatcher`]
#[derive(Debug)]
pub struct DeferredQueue {
    action_rx: Receiver<Value>,
}

impl DeferredQueue {
    /// Dispatch queued actions in FIFO order until the queue is empty.
    ///
    /// Actions queued while draining are processed in the same call. Stops
    /// at the first failing dispatch; the remaining actions stay queued.
    pub fn drain(&self, store: &Store) -> Result<usize> {
        self.drain_with(|action| store.dispatch(action))
    }

    fn drain_with(&self, dispatch: impl Fn(Value) -> Result<Value>) -> Result<usize> {
        let mut count = 0;
        while let Ok(action) = self.action_rx.try_recv() {
            dispatch(action)?;
            count += 1;
        }
        if count > 0 {
            log::debug!("Dispatcher: drained {} queued action(s)", count);
        }
        Ok(count)
    }
}

/// Create a connected dispatcher and queue
pub fn channel_pair() -> (Dispatcher, DeferredQueue) {
    let (action_tx, action_rx) = channel();
    (Dispatcher { action_tx }, DeferredQueue { action_rx })
}

/// Drains the queue after each dispatch that passes through it
///
/// Install it first so drained actions see every other middleware. A queued
/// action that fails is logged and dropped; the dispatch that triggered the
/// drain still returns its own result. Use [`DeferredQueue::drain`] directly
/// when the error matters.
#[derive(Debug)]
pub struct DeferredMiddleware {
    queue: DeferredQueue,
    draining: Cell<bool>,
}

impl DeferredMiddleware {
    pub fn new(queue: DeferredQueue) -> Self {
        Self {
            queue,
            draining: Cell::new(false),
        }
    }
}

impl Middleware for DeferredMiddleware {
    fn handle(&self, api: &MiddlewareApi, action: Value, next: &Dispatch) -> Result<Value> {
        let result = next(action)?;

        // Drained actions come back through this middleware; only the
        // outermost call drains.
        if !self.draining.replace(true) {
            let drained = self.queue.drain_with(|action| api.dispatch(action));
            self.draining.set(false);
            // The caller's action is already committed; a queued action
            // failing is not its failure.
            if let Err(e) = drained {
                log::error!("DeferredMiddleware: queued action failed: {}", e);
            }
        }

        Ok(result)
    }
}

/// A dispatcher plus the middleware that drains it
pub fn deferred() -> (Dispatcher, DeferredMiddleware) {
    let (dispatcher, queue) = channel_pair();
    (dispatcher, DeferredMiddleware::new(queue))
}
