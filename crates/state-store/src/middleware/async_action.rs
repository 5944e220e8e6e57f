//! AsyncMiddleware - runs deferred work carried by async actions
//!
//! Async actions are consumed here and never reach the reducer. Their work
//! runs on a tokio task with a store handle, so it can dispatch as many
//! follow-up actions as it likes. Failures (errors and panics) are reported
//! to the error sink and never reach the original `dispatch` caller.

use super::{describe, resolve_runtime, Middleware, Next};
use crate::action::{Action, Intent, Payload};
use crate::error::StoreError;
use crate::reducer::State;
use crate::sink::{log_error_sink, ErrorReport, ErrorSink};
use crate::store::Store;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

pub struct AsyncMiddleware {
    runtime: Option<Handle>,
    error_sink: ErrorSink,
    /// In-flight work, aborted on dispose
    tasks: Mutex<Vec<AbortHandle>>,
}

impl AsyncMiddleware {
    /// Spawn on whichever tokio runtime `dispatch` is called from
    pub fn new() -> Self {
        Self {
            runtime: None,
            error_sink: log_error_sink(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Always spawn on the given runtime
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_error_sink(mut self, sink: ErrorSink) -> Self {
        self.error_sink = sink;
        self
    }

    /// Number of tasks that have not finished yet
    pub fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.len()
    }
}

impl Default for AsyncMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, I: Intent> Middleware<S, I> for AsyncMiddleware {
    fn handle(
        &self,
        store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        let Payload::Async(work) = action.payload() else {
            return next.run(action);
        };

        let runtime = resolve_runtime(self.runtime.as_ref())?;
        let label = work.label();
        let description = describe(&action);
        let sink = self.error_sink.clone();

        log::debug!("AsyncMiddleware: starting '{}'", label);
        let task = runtime.spawn(work.run(store.clone()));
        let abort = task.abort_handle();

        // Watch the task so failures land in the sink instead of vanishing
        runtime.spawn(async move {
            match task.await {
                Ok(Ok(())) => log::debug!("AsyncMiddleware: '{}' finished", label),
                Ok(Err(e)) => sink(&ErrorReport::new(&e, description, format!("{:?}", e))),
                Err(e) if e.is_panic() => {
                    let error = StoreError::from_panic(e.into_panic());
                    sink(&ErrorReport::new(&error, description, String::new()));
                }
                Err(_) => log::debug!("AsyncMiddleware: '{}' cancelled", label),
            }
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(abort);
        Ok(())
    }

    fn dispose(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        log::debug!("AsyncMiddleware: aborting {} task(s)", tasks.len());
        for task in tasks {
            task.abort();
        }
    }
}
