//! Middleware for statefold stores
//!
//! - [`LoggingMiddleware`] logs every action passing through
//! - [`Dispatcher`] / [`DeferredMiddleware`] queue actions raised where a
//!   synchronous dispatch would be reentrant (listeners, reducers) and feed
//!   them through the chain once the current dispatch is done
//! - [`ActionFilter`] swallows actions before they reach the reducer

pub mod dispatcher;
pub mod filter;
pub mod logging;

pub use dispatcher::{channel_pair, deferred, DeferredMiddleware, DeferredQueue, Dispatcher};
pub use filter::ActionFilter;
pub use logging::LoggingMiddleware;
