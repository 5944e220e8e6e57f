//! PerformanceMiddleware - flags dispatches slower than a threshold
//!
//! Everything inside `next` (inner middleware plus reducer) is expected to
//! finish within a frame. Slower dispatches emit [`Notice::SlowDispatch`].

use super::{kind_label, Middleware, Next};
use crate::action::{Action, Intent};
use crate::config::MiddlewareConfig;
use crate::error::StoreError;
use crate::reducer::State;
use crate::sink::{log_notice_sink, Notice, NoticeSink};
use crate::store::Store;
use std::time::{Duration, Instant};

pub const DEFAULT_SLOW_DISPATCH_THRESHOLD: Duration = Duration::from_millis(16);

pub struct PerformanceMiddleware {
    threshold: Duration,
    notice_sink: NoticeSink,
}

impl PerformanceMiddleware {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SLOW_DISPATCH_THRESHOLD)
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            threshold,
            notice_sink: log_notice_sink(),
        }
    }

    pub fn from_config(config: &MiddlewareConfig) -> Self {
        Self::with_threshold(config.slow_dispatch_threshold())
    }

    pub fn with_notice_sink(mut self, sink: NoticeSink) -> Self {
        self.notice_sink = sink;
        self
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}

impl Default for PerformanceMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, I: Intent> Middleware<S, I> for PerformanceMiddleware {
    fn handle(
        &self,
        _store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        let kind = kind_label(&action);
        let started = Instant::now();
        let result = next.run(action);
        let elapsed = started.elapsed();

        if elapsed > self.threshold {
            (self.notice_sink)(&Notice::SlowDispatch {
                kind,
                elapsed,
                threshold: self.threshold,
            });
        }
        result
    }
}
