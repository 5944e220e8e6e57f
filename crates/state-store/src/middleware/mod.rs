//! Middleware system
//!
//! Middleware sits between action dispatch and reducer execution, allowing
//! side effects, async operations, logging, and other cross-cutting concerns
//! to be handled in a composable way.
//!
//! ## Design
//!
//! ```text
//! dispatch → [m0 → [m1 → [m2 → reducer] ] ]
//! ```
//!
//! The chain is an onion: each middleware receives a [`Next`] pointing at the
//! rest of the chain. The first middleware added is the outermost and sees
//! each action both before and after everything inside it ran.
//!
//! Each middleware can:
//! - Inspect actions and state
//! - Forward a different action to `next`
//! - Call `next` later (debounce) or never (filter, throttle)
//! - Dispatch new actions through the full chain via the store handle
//!
//! ## Example
//!
//! ```rust,ignore
//! struct LogKinds;
//!
//! impl<S: State, I: Intent> Middleware<S, I> for LogKinds {
//!     fn handle(
//!         &self,
//!         _store: &Store<S, I>,
//!         action: Action<S, I>,
//!         next: Next<S, I>,
//!     ) -> Result<(), StoreError> {
//!         log::debug!("Action: {:?}", action.kind());
//!         next.run(action) // Continue to next middleware
//!     }
//! }
//! ```

use crate::action::{Action, Intent, Payload};
use crate::error::StoreError;
use crate::store::Store;
use tokio::runtime::Handle;

mod async_action;
mod batch;
mod conditional;
mod debounce;
mod error_boundary;
mod filter;
mod logging;
mod performance;
mod throttle;
mod transform;

pub use crate::store::Next;
pub use async_action::AsyncMiddleware;
pub use batch::BatchMiddleware;
pub use conditional::ConditionalMiddleware;
pub use debounce::DebounceMiddleware;
pub use error_boundary::ErrorBoundaryMiddleware;
pub use filter::FilterMiddleware;
pub use logging::{LogRecord, LogSink, LoggingMiddleware};
pub use performance::PerformanceMiddleware;
pub use throttle::ThrottleMiddleware;
pub use transform::{Transform, TransformMiddleware};

/// Middleware trait - intercepts actions on their way to the reducer
pub trait Middleware<S, I>: Send + Sync {
    /// Handle an action
    ///
    /// - `store`: handle for reading state or dispatching from the top
    /// - `action`: the action being dispatched
    /// - `next`: the rest of the chain; skip calling it to consume the action
    ///
    /// Errors returned by `next` should be passed back up unless this
    /// middleware exists to absorb them.
    fn handle(
        &self,
        store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError>;

    /// Release timers and in-flight work; called once by `Store::dispose`
    fn dispose(&self) {}
}

/// Short label for notices, e.g. `Intent(Increment)`
pub(crate) fn kind_label<S, I: Intent>(action: &Action<S, I>) -> String {
    format!("{:?}", action.kind())
}

/// Compact description for reports and log lines
pub(crate) fn describe<S, I: Intent>(action: &Action<S, I>) -> String {
    match action.payload() {
        Payload::Intent(intent) => format!("{:?}", intent),
        Payload::Async(work) => format!("Async({})", work.label()),
        Payload::Batch(actions) => format!("Batch({} actions)", actions.len()),
    }
}

/// Runtime to spawn on: the configured one, else the caller's
pub(crate) fn resolve_runtime(configured: Option<&Handle>) -> Result<Handle, StoreError> {
    match configured {
        Some(handle) => Ok(handle.clone()),
        None => Handle::try_current().map_err(|e| StoreError::Runtime(e.to_string())),
    }
}
