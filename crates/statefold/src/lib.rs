//! Predictable in-process state container
//!
//! This crate provides:
//! - A [`Store`] holding one immutable [`State`], changed only by dispatching
//!   [`Action`]s through a [`Reducer`]
//! - Listener subscriptions with snapshot isolation and an observable view
//! - [`combine_reducers`] to build one reducer from named sub-reducers
//! - [`apply_middleware`] to wrap dispatch with interceptors
//! - [`compose`] for right-to-left function composition
//!
//! ```
//! use serde_json::json;
//! use statefold::{create_store, Reducer, State};
//!
//! let counter = Reducer::new(|state, action| {
//!     let count = state.and_then(|s| s.as_i64()).unwrap_or(0);
//!     Some(State::from(if action.is("INCREMENT") { count + 1 } else { count }))
//! });
//! let store = create_store(counter, None, None).unwrap();
//! store.dispatch(json!({"type": "INCREMENT"})).unwrap();
//! store.dispatch(json!({"type": "INCREMENT"})).unwrap();
//! assert_eq!(store.get_state().as_i64(), Some(2));
//! ```

pub mod action;
pub mod combine;
pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod listener;
pub mod middleware;
pub mod reducer;
pub mod state;
pub mod store;
pub mod utils;

pub use action::{action_types, Action};
pub use combine::{combine_reducers, combine_reducers_with, ReducerMap};
pub use compose::{compose, Composable};
pub use config::Mode;
pub use diagnostics::Diagnostics;
pub use error::{Result, StoreError};
pub use listener::Listener;
pub use middleware::{apply_middleware, Middleware, MiddlewareApi};
pub use reducer::Reducer;
pub use state::{Record, State};
pub use store::{
    base_factory, create_store, Dispatch, Enhancer, Observer, Phase, Store, StoreBuilder,
    StoreFactory, StoreObservable, Subscription, WeakStore,
};
pub use utils::is_plain_record;
