//! DebounceMiddleware - waits for a quiet period before forwarding
//!
//! Each action kind has at most one pending timer. A new action of the same
//! kind cancels the pending one and restarts the wait, so only the most
//! recent action survives. When the wait completes the action continues
//! down the chain from this middleware's position.
//!
//! Timers run as tokio tasks. `dispose` aborts every pending timer so nothing
//! fires into a disposed store.

use super::{describe, resolve_runtime, Middleware, Next};
use crate::action::{Action, ActionKind, Intent};
use crate::config::MiddlewareConfig;
use crate::error::StoreError;
use crate::reducer::State;
use crate::sink::{log_error_sink, ErrorReport, ErrorSink};
use crate::store::Store;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

struct PendingTimer {
    generation: u64,
    handle: AbortHandle,
}

type TimerMap<K> = Arc<Mutex<HashMap<ActionKind<K>, PendingTimer>>>;

pub struct DebounceMiddleware<I: Intent> {
    duration: Duration,
    /// Restrict debouncing to these intent kinds; `None` debounces everything
    only: Option<HashSet<I::Kind>>,
    runtime: Option<Handle>,
    pending: TimerMap<I::Kind>,
    generation: AtomicU64,
    error_sink: ErrorSink,
}

impl<I: Intent> DebounceMiddleware<I> {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            only: None,
            runtime: None,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            error_sink: log_error_sink(),
        }
    }

    pub fn from_config(config: &MiddlewareConfig) -> Self {
        Self::new(config.debounce())
    }

    /// Only debounce intents of the given kinds
    pub fn only(mut self, kinds: impl IntoIterator<Item = I::Kind>) -> Self {
        self.only = Some(kinds.into_iter().collect());
        self
    }

    /// Run timers on the given runtime instead of the caller's
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Where failures of delayed `next` calls are reported
    pub fn with_error_sink(mut self, sink: ErrorSink) -> Self {
        self.error_sink = sink;
        self
    }

    /// Number of kinds with a pending timer
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    fn applies_to(&self, kind: &ActionKind<I::Kind>) -> bool {
        match (&self.only, kind) {
            (None, _) => true,
            (Some(kinds), ActionKind::Intent(kind)) => kinds.contains(kind),
            (Some(_), _) => false,
        }
    }
}

impl<S: State, I: Intent> Middleware<S, I> for DebounceMiddleware<I> {
    fn handle(
        &self,
        _store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        let kind = action.kind();
        if !self.applies_to(&kind) {
            return next.run(action);
        }

        let runtime = resolve_runtime(self.runtime.as_ref())?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let duration = self.duration;
        let pending = Arc::clone(&self.pending);
        let sink = self.error_sink.clone();
        let timer_kind = kind.clone();

        // Hold the map lock until the new timer is registered so the task
        // cannot look itself up before it exists
        let mut timers = self.pending.lock();
        if let Some(previous) = timers.remove(&kind) {
            log::trace!("DebounceMiddleware: replacing pending {:?}", kind);
            previous.handle.abort();
        }

        let task = runtime.spawn(async move {
            tokio::time::sleep(duration).await;

            {
                let mut timers = pending.lock();
                match timers.get(&timer_kind) {
                    Some(timer) if timer.generation == generation => {
                        timers.remove(&timer_kind);
                    }
                    // Superseded between wake-up and here
                    _ => return,
                }
            }

            let description = describe(&action);
            match catch_unwind(AssertUnwindSafe(|| next.run(action))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    sink(&ErrorReport::new(&error, description, format!("{:?}", error)))
                }
                Err(panic) => {
                    let error = StoreError::from_panic(panic);
                    sink(&ErrorReport::new(&error, description, String::new()));
                }
            }
        });

        timers.insert(
            kind,
            PendingTimer {
                generation,
                handle: task.abort_handle(),
            },
        );
        Ok(())
    }

    fn dispose(&self) {
        let timers: Vec<_> = self.pending.lock().drain().collect();
        log::debug!("DebounceMiddleware: cancelling {} timer(s)", timers.len());
        for (_, timer) in timers {
            timer.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{counter_reducer, CounterIntent, CounterKind, CounterState};

    fn debounced_store(
        debounce: DebounceMiddleware<CounterIntent>,
    ) -> Store<CounterState, CounterIntent> {
        Store::builder(CounterState::default(), counter_reducer())
            .add_middleware(debounce)
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_action_fires_after_quiet_period() {
        let store = debounced_store(DebounceMiddleware::new(Duration::from_millis(300)));
        let mut sub = store.subscribe();
        sub.try_recv();

        // t=0, t=100, t=150
        store.dispatch_intent(CounterIntent::Increment(1)).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.dispatch_intent(CounterIntent::Increment(2)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.dispatch_intent(CounterIntent::Increment(3)).unwrap();

        // t=449: still waiting
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(store.state().counter, 0);

        // t=451: fired once with the last payload
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(store.state().counter, 3);
        assert_eq!(sub.drain(), vec![CounterState { counter: 3 }]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_have_separate_timers() {
        let store = debounced_store(DebounceMiddleware::new(Duration::from_millis(100)));

        store.dispatch_intent(CounterIntent::Increment(10)).unwrap();
        store.dispatch_intent(CounterIntent::Decrement(3)).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(store.state().counter, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_restricts_kinds() {
        let store = debounced_store(
            DebounceMiddleware::new(Duration::from_millis(100)).only([CounterKind::Increment]),
        );

        store.dispatch_intent(CounterIntent::Decrement(1)).unwrap();
        assert_eq!(store.state().counter, -1);

        store.dispatch_intent(CounterIntent::Increment(1)).unwrap();
        assert_eq!(store.state().counter, -1);
        tokio::time::sleep(Duration::from_millis(101)).await;
        assert_eq!(store.state().counter, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_pending_timers() {
        let debounce = Arc::new(DebounceMiddleware::<CounterIntent>::new(
            Duration::from_millis(100),
        ));
        let store = Store::builder(CounterState::default(), counter_reducer())
            .add_middleware(SharedDebounce(Arc::clone(&debounce)))
            .build();

        store.dispatch_intent(CounterIntent::Increment(1)).unwrap();
        store.dispatch_intent(CounterIntent::Reset).unwrap();
        assert_eq!(debounce.pending(), 2);

        store.dispose();
        assert_eq!(debounce.pending(), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(store.state().counter, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_delay_goes_to_sink() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink: ErrorSink = {
            let reports = Arc::clone(&reports);
            Arc::new(move |report: &ErrorReport| reports.lock().push(report.clone()))
        };
        let store = debounced_store(
            DebounceMiddleware::new(Duration::from_millis(50)).with_error_sink(sink),
        );

        store.dispatch_intent(CounterIntent::Fail).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        let reports = reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].action, "Fail");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_after_delay_goes_to_sink() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink: ErrorSink = {
            let reports = Arc::clone(&reports);
            Arc::new(move |report: &ErrorReport| reports.lock().push(report.clone()))
        };
        let store = debounced_store(
            DebounceMiddleware::new(Duration::from_millis(50)).with_error_sink(sink),
        );

        store.dispatch_intent(CounterIntent::Panic).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        {
            let reports = reports.lock();
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].action, "Panic");
            assert!(reports[0].error.contains("reducer panicked on purpose"));
        }

        // Store still usable after the panic
        store.dispatch_intent(CounterIntent::Increment(2)).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.state().counter, 2);
    }

    /// Lets the test keep a handle on the middleware the store owns
    struct SharedDebounce(Arc<DebounceMiddleware<CounterIntent>>);

    impl Middleware<CounterState, CounterIntent> for SharedDebounce {
        fn handle(
            &self,
            store: &Store<CounterState, CounterIntent>,
            action: Action<CounterState, CounterIntent>,
            next: Next<CounterState, CounterIntent>,
        ) -> Result<(), StoreError> {
            Middleware::<CounterState, CounterIntent>::handle(self.0.as_ref(), store, action, next)
        }

        fn dispose(&self) {
            Middleware::<CounterState, CounterIntent>::dispose(self.0.as_ref());
        }
    }
}
