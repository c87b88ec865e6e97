//! Middleware pipeline
//!
//! Middleware sits between `dispatch` and the reducer:
//!
//! ```text
//! dispatch → first middleware → … → last middleware → base dispatch → reducer
//! ```
//!
//! Each middleware can:
//! - inspect actions and the current state
//! - dispatch new actions (they re-enter the chain from the top)
//! - transform, swallow or forward the action to `next`
//! - post-process whatever `next` returned
//!
//! ## Example
//!
//! ```rust
//! use statefold::{
//!     apply_middleware, create_store, Dispatch, Middleware, MiddlewareApi, Reducer, Result, State,
//! };
//! use serde_json::{json, Value};
//! use std::rc::Rc;
//!
//! let logger: Rc<dyn Middleware> =
//!     Rc::new(|_api: &MiddlewareApi, action: Value, next: &Dispatch| -> Result<Value> {
//!         log::debug!("Action: {}", action);
//!         next(action)
//!     });
//! let reducer = Reducer::new(|state, _action| state.or(Some(State::Null)));
//! let store = create_store(reducer, None, Some(apply_middleware(vec![logger]))).unwrap();
//! store.dispatch(json!({"type": "PING"})).unwrap();
//! ```

use crate::compose::{compose, Composable};
use crate::error::Result;
use crate::reducer::Reducer;
use crate::state::State;
use crate::store::{Dispatch, Enhancer, Store, StoreFactory};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// What a middleware can reach: the store's state and the final dispatch.
///
/// `dispatch` always goes to the dispatch that is current at call time.
/// Middleware is set up before the composed dispatch exists, so during
/// setup it reaches the store's dispatch without any middleware.
#[derive(Clone)]
pub struct MiddlewareApi {
    store: Store,
    dispatch: Weak<RefCell<Dispatch>>,
}

impl MiddlewareApi {
    pub fn get_state(&self) -> State {
        self.store.get_state()
    }

    /// Dispatch through the full middleware chain
    pub fn dispatch(&self, action: impl Into<Value>) -> Result<Value> {
        let dispatch = match self.dispatch.upgrade() {
            Some(current) => current.borrow().clone(),
            None => self.store.dispatcher(),
        };
        dispatch(action.into())
    }
}

impl fmt::Debug for MiddlewareApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareApi")
            .field("store", &self.store)
            .finish()
    }
}

/// Intercepts dispatched actions.
///
/// `handle` receives the action and the `next` dispatch in the chain; call
/// `next(action)` to pass the action on, or return without calling it to
/// swallow the action.
pub trait Middleware {
    /// Called once, in chain order, when the middleware is applied
    fn setup(&self, _api: &MiddlewareApi) {}

    fn handle(&self, api: &MiddlewareApi, action: Value, next: &Dispatch) -> Result<Value>;
}

impl<F> Middleware for F
where
    F: Fn(&MiddlewareApi, Value, &Dispatch) -> Result<Value>,
{
    fn handle(&self, api: &MiddlewareApi, action: Value, next: &Dispatch) -> Result<Value> {
        self(api, action, next)
    }
}

/// Build an enhancer that routes `dispatch` through `middlewares`.
///
/// The first middleware is the outermost: it sees each action first and
/// the result last. The last middleware calls the store's own dispatch.
pub fn apply_middleware(middlewares: Vec<Rc<dyn Middleware>>) -> Enhancer {
    Rc::new(move |create: StoreFactory| -> StoreFactory {
        let middlewares = middlewares.clone();
        Rc::new(move |reducer: Reducer, preloaded_state: Option<State>| -> Result<Store> {
            let store = create(reducer, preloaded_state)?;
            let base_dispatch = store.dispatcher();

            // Late-bound slot: starts out as the base dispatch and is
            // replaced by the composed one below. The api only holds a weak
            // reference so the chain does not keep itself alive.
            let current = Rc::new(RefCell::new(base_dispatch.clone()));
            let api = MiddlewareApi {
                store: store.clone(),
                dispatch: Rc::downgrade(&current),
            };

            let chain: Vec<Composable<Dispatch>> = middlewares
                .iter()
                .map(|middleware| {
                    middleware.setup(&api);
                    wrap(middleware.clone(), api.clone())
                })
                .collect();
            log::debug!("applying {} middleware", chain.len());

            let composed = compose(chain)(base_dispatch);
            *current.borrow_mut() = composed;

            let dispatch: Dispatch = Rc::new(move |action: Value| {
                let dispatch = current.borrow().clone();
                dispatch(action)
            });
            Ok(store.with_dispatch(dispatch))
        })
    })
}

/// The `next -> handler` stage of a middleware bound to its api
fn wrap(middleware: Rc<dyn Middleware>, api: MiddlewareApi) -> Composable<Dispatch> {
    Rc::new(move |next: Dispatch| -> Dispatch {
        let middleware = middleware.clone();
        let api = api.clone();
        Rc::new(move |action: Value| middleware.handle(&api, action, &next))
    })
}
