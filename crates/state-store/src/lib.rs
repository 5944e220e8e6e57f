//! Single-writer observable state store
//!
//! This crate provides:
//! - [`Store`]: owns state, runs actions through middleware into a reducer
//! - [`StateHistory`]: bounded undo/redo with branch discarding
//! - A middleware catalogue: async, batch, debounce, throttle, filter,
//!   transform, conditional, error boundary, logging and performance
//! - [`StoreConfig`]: TOML-backed settings for the store and middleware
//!
//! ```text
//! dispatch(action) → action log → middleware chain → reducer → state
//!                                                         └→ history, subscribers
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod history;
pub mod middleware;
pub mod reducer;
pub mod sink;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{Action, ActionKind, AsyncAction, BoxFuture, Intent, Payload};
pub use config::{HistoryConfig, MiddlewareConfig, StoreConfig};
pub use error::StoreError;
pub use history::StateHistory;
pub use middleware::{Middleware, Next};
pub use reducer::{from_fn, Reducer, State};
pub use sink::{ErrorReport, ErrorSink, Notice, NoticeSink};
pub use store::{Store, StoreBuilder, Subscription};
