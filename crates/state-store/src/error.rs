//! Error types for the store and its middleware

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`Store`](crate::Store) operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// `undo`/`redo` called on a store built without history
    #[error("History is not enabled for this store")]
    HistoryDisabled,

    /// The reducer rejected an action
    #[error("Reducer failed: {0}")]
    Reducer(#[source] anyhow::Error),

    /// A panic caught by the error boundary middleware
    #[error("Panic while dispatching: {0}")]
    Panicked(String),

    /// Middleware that needs a tokio runtime was used outside of one
    #[error("No tokio runtime available: {0}")]
    Runtime(String),

    /// Failed to read or parse a config file
    #[error("Failed to load config from {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// No store registered for the requested context (binding layers)
    #[error("No store registered for {0}")]
    NoStoreRegistered(String),
}

impl StoreError {
    /// Build a `Panicked` error from a `catch_unwind` payload
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        StoreError::Panicked(message)
    }
}
