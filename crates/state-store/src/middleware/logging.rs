//! LoggingMiddleware - logs every action with the state around it

use super::{describe, Middleware, Next};
use crate::action::{Action, Intent};
use crate::error::StoreError;
use crate::reducer::State;
use crate::store::Store;
use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One logged dispatch
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub action: String,
    pub prev_state: String,
    pub next_state: String,
    pub elapsed: Duration,
    /// Error returned by the inner chain, if any
    pub error: Option<String>,
    /// When the action was created (timestamped mode only)
    pub created_at: Option<DateTime<Utc>>,
    /// When the dispatch finished (timestamped mode only)
    pub logged_at: Option<DateTime<Local>>,
}

pub type LogSink = Arc<dyn Fn(&LogRecord) + Send + Sync>;

/// LoggingMiddleware - records pre-state, action, post-state and timing
///
/// Pure observer: it always forwards and passes the inner result back up.
pub struct LoggingMiddleware {
    timestamped: bool,
    /// `None` writes through the `log` facade
    sink: Option<LogSink>,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self {
            timestamped: false,
            sink: None,
        }
    }

    /// Also record the action's creation time and the wall clock
    pub fn timestamped() -> Self {
        Self {
            timestamped: true,
            ..Self::new()
        }
    }

    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = Some(sink);
        self
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

fn log_record(record: &LogRecord) {
    match (&record.logged_at, &record.error) {
        (_, Some(error)) => log::warn!(
            "Action: {} failed after {:?}: {}",
            record.action,
            record.elapsed,
            error
        ),
        (Some(logged_at), None) => log::debug!(
            "[{}] Action: {} (created {}) {} -> {} in {:?}",
            logged_at.format("%H:%M:%S%.3f"),
            record.action,
            record
                .created_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            record.prev_state,
            record.next_state,
            record.elapsed
        ),
        (None, None) => log::debug!(
            "Action: {} {} -> {} in {:?}",
            record.action,
            record.prev_state,
            record.next_state,
            record.elapsed
        ),
    }
}

impl<S: State, I: Intent> Middleware<S, I> for LoggingMiddleware {
    fn handle(
        &self,
        store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        // Formatting state is the expensive part; skip it when nothing reads it
        let capture = self.sink.is_some() || log::log_enabled!(log::Level::Debug);
        let snapshot = |store: &Store<S, I>| {
            if capture {
                format!("{:?}", store.state())
            } else {
                String::new()
            }
        };

        let description = describe(&action);
        let created_at = self.timestamped.then(|| action.created_at());
        let prev_state = snapshot(store);

        let started = Instant::now();
        let result = next.run(action);
        let elapsed = started.elapsed();

        if !capture && result.is_ok() {
            return result;
        }

        let record = LogRecord {
            action: description,
            prev_state,
            next_state: snapshot(store),
            elapsed,
            error: result.as_ref().err().map(ToString::to_string),
            created_at,
            logged_at: self.timestamped.then(Local::now),
        };
        match &self.sink {
            Some(sink) => sink(&record),
            None => log_record(&record),
        }

        result
    }
}
