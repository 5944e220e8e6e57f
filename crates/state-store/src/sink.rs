//! Observability sinks
//!
//! Middleware never writes to a fixed destination. Notices (throttled,
//! filtered, slow dispatches) and error reports go through callbacks that
//! default to the `log` facade and can be swapped by the embedding app.

use std::sync::Arc;
use std::time::Duration;

/// Something a middleware wants the outside world to know about
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Dropped by the throttle middleware
    Throttled { kind: String, remaining: Duration },
    /// Dropped by the filter middleware
    Filtered { kind: String },
    /// Dropped by the conditional middleware
    Suppressed { kind: String },
    /// Dropped by a transform that chose to suppress
    Transformed { kind: String },
    /// The inner chain took longer than the configured threshold
    SlowDispatch {
        kind: String,
        elapsed: Duration,
        threshold: Duration,
    },
}

/// A failure caught by the error boundary or the async middleware
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Display form of the error
    pub error: String,
    /// Debug form of the originating action
    pub action: String,
    /// Error chain, plus a backtrace when one was captured
    pub trace: String,
}

impl ErrorReport {
    pub fn new(error: &dyn std::fmt::Display, action: String, trace: String) -> Self {
        Self {
            error: error.to_string(),
            action,
            trace,
        }
    }
}

pub type NoticeSink = Arc<dyn Fn(&Notice) + Send + Sync>;
pub type ErrorSink = Arc<dyn Fn(&ErrorReport) + Send + Sync>;

/// Default notice sink: `log::warn!` for slow and throttled dispatches, `log::debug!` otherwise
pub fn log_notice_sink() -> NoticeSink {
    Arc::new(|notice: &Notice| match notice {
        Notice::SlowDispatch {
            kind,
            elapsed,
            threshold,
        } => {
            log::warn!(
                "Slow dispatch: {} took {:?} (threshold {:?})",
                kind,
                elapsed,
                threshold
            );
        }
        Notice::Throttled { kind, remaining } => {
            log::warn!("Throttled {} ({:?} remaining)", kind, remaining);
        }
        Notice::Filtered { kind } => log::debug!("Filtered {}", kind),
        Notice::Suppressed { kind } => log::debug!("Suppressed {}", kind),
        Notice::Transformed { kind } => log::debug!("Transform suppressed {}", kind),
    })
}

/// Default error sink: `log::error!`
pub fn log_error_sink() -> ErrorSink {
    Arc::new(|report: &ErrorReport| {
        log::error!(
            "Error while handling {}: {}\n{}",
            report.action,
            report.error,
            report.trace
        );
    })
}
