//! ErrorBoundaryMiddleware - absorbs failures from the inner chain
//!
//! Reducer errors and panics raised anywhere inside `next` are reported to
//! the error sink and swallowed, so one bad action cannot take the app down.
//! State committed before the failure stays committed.

use super::{describe, Middleware, Next};
use crate::action::{Action, Intent};
use crate::error::StoreError;
use crate::reducer::State;
use crate::sink::{log_error_sink, ErrorReport, ErrorSink};
use crate::store::Store;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub struct ErrorBoundaryMiddleware {
    error_sink: ErrorSink,
}

impl ErrorBoundaryMiddleware {
    pub fn new() -> Self {
        Self {
            error_sink: log_error_sink(),
        }
    }

    pub fn with_error_sink(sink: ErrorSink) -> Self {
        Self { error_sink: sink }
    }
}

impl Default for ErrorBoundaryMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

/// Error chain with an optional backtrace for reducer failures
fn trace_of(error: &StoreError) -> String {
    match error {
        StoreError::Reducer(inner) => format!("{:?}", inner),
        other => {
            let mut trace = other.to_string();
            let mut source = std::error::Error::source(other);
            while let Some(cause) = source {
                trace.push_str("\ncaused by: ");
                trace.push_str(&cause.to_string());
                source = cause.source();
            }
            trace
        }
    }
}

impl<S: State, I: Intent> Middleware<S, I> for ErrorBoundaryMiddleware {
    fn handle(
        &self,
        _store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        let description = describe(&action);

        let error = match catch_unwind(AssertUnwindSafe(|| next.run(action))) {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(error)) => error,
            Err(panic) => StoreError::from_panic(panic),
        };

        (self.error_sink)(&ErrorReport::new(&error, description, trace_of(&error)));
        Ok(())
    }
}
