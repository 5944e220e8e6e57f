//! ThrottleMiddleware - at most one action per kind per time window
//!
//! The first action of a kind always passes and starts a window. An action of
//! the same kind passes again only once strictly more than the window has
//! elapsed; earlier ones are dropped and reported as [`Notice::Throttled`].

use super::{kind_label, Middleware, Next};
use crate::action::{Action, ActionKind, Intent};
use crate::config::MiddlewareConfig;
use crate::error::StoreError;
use crate::reducer::State;
use crate::sink::{log_notice_sink, Notice, NoticeSink};
use crate::store::Store;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

pub struct ThrottleMiddleware<I: Intent> {
    duration: Duration,
    /// Restrict throttling to these intent kinds; `None` throttles everything
    only: Option<HashSet<I::Kind>>,
    last_run: Mutex<HashMap<ActionKind<I::Kind>, Instant>>,
    notice_sink: NoticeSink,
}

impl<I: Intent> ThrottleMiddleware<I> {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            only: None,
            last_run: Mutex::new(HashMap::new()),
            notice_sink: log_notice_sink(),
        }
    }

    pub fn from_config(config: &MiddlewareConfig) -> Self {
        Self::new(config.throttle())
    }

    /// Only throttle intents of the given kinds
    pub fn only(mut self, kinds: impl IntoIterator<Item = I::Kind>) -> Self {
        self.only = Some(kinds.into_iter().collect());
        self
    }

    pub fn with_notice_sink(mut self, sink: NoticeSink) -> Self {
        self.notice_sink = sink;
        self
    }

    fn applies_to(&self, kind: &ActionKind<I::Kind>) -> bool {
        match (&self.only, kind) {
            (None, _) => true,
            (Some(kinds), ActionKind::Intent(kind)) => kinds.contains(kind),
            (Some(_), _) => false,
        }
    }

    /// Claim the window for `kind`, or return how long until it reopens
    fn try_acquire(&self, kind: ActionKind<I::Kind>) -> Result<(), Duration> {
        let now = Instant::now();
        let mut last_run = self.last_run.lock();
        if let Some(last) = last_run.get(&kind) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed <= self.duration {
                return Err(self.duration - elapsed);
            }
        }
        last_run.insert(kind, now);
        Ok(())
    }
}

impl<S: State, I: Intent> Middleware<S, I> for ThrottleMiddleware<I> {
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

        match self.try_acquire(kind) {
            Ok(()) => next.run(action),
            Err(remaining) => {
                (self.notice_sink)(&Notice::Throttled {
                    kind: kind_label(&action),
                    remaining,
                });
                Ok(())
            }
        }
    }

    fn dispose(&self) {
        self.last_run.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{counter_reducer, CounterIntent, CounterKind, CounterState};
    use std::sync::Arc;

    fn throttled_store(
        throttle: ThrottleMiddleware<CounterIntent>,
    ) -> Store<CounterState, CounterIntent> {
        Store::builder(CounterState::default(), counter_reducer())
            .add_middleware(throttle)
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_window() {
        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink: NoticeSink = {
            let notices = Arc::clone(&notices);
            Arc::new(move |notice: &Notice| notices.lock().push(notice.clone()))
        };
        let store = throttled_store(
            ThrottleMiddleware::new(Duration::from_millis(1000)).with_notice_sink(sink),
        );

        // t=0
        store.dispatch_intent(CounterIntent::Increment(1)).unwrap();
        tokio::time::advance(Duration::from_millis(400)).await;
        // t=400
        store.dispatch_intent(CounterIntent::Increment(10)).unwrap();
        tokio::time::advance(Duration::from_millis(800)).await;
        // t=1200
        store.dispatch_intent(CounterIntent::Increment(100)).unwrap();

        assert_eq!(store.state().counter, 101);
        assert_eq!(
            notices.lock().as_slice(),
            &[Notice::Throttled {
                kind: "Intent(Increment)".to_string(),
                remaining: Duration::from_millis(600),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_at_exact_window_end_is_dropped() {
        let store = throttled_store(ThrottleMiddleware::new(Duration::from_millis(1000)));

        store.dispatch_intent(CounterIntent::Increment(1)).unwrap();
        tokio::time::advance(Duration::from_millis(1000)).await;
        store.dispatch_intent(CounterIntent::Increment(10)).unwrap();
        assert_eq!(store.state().counter, 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        store.dispatch_intent(CounterIntent::Increment(100)).unwrap();
        assert_eq!(store.state().counter, 101);
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_are_throttled_independently() {
        let store = throttled_store(ThrottleMiddleware::new(Duration::from_secs(1)));

        store.dispatch_intent(CounterIntent::Increment(5)).unwrap();
        store.dispatch_intent(CounterIntent::Decrement(2)).unwrap();
        store.dispatch_intent(CounterIntent::Decrement(2)).unwrap();

        assert_eq!(store.state().counter, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_restricts_kinds() {
        let store = throttled_store(
            ThrottleMiddleware::new(Duration::from_secs(1)).only([CounterKind::Increment]),
        );

        store.dispatch_intent(CounterIntent::Increment(1)).unwrap();
        store.dispatch_intent(CounterIntent::Increment(1)).unwrap();
        store.dispatch_intent(CounterIntent::Decrement(1)).unwrap();
        store.dispatch_intent(CounterIntent::Decrement(1)).unwrap();

        assert_eq!(store.state().counter, -1);
    }

    #[test]
    fn test_dispose_forgets_windows() {
        let throttle: ThrottleMiddleware<CounterIntent> =
            ThrottleMiddleware::new(Duration::from_secs(60));
        assert!(throttle.try_acquire(ActionKind::Intent(CounterKind::Reset)).is_ok());
        assert!(throttle.try_acquire(ActionKind::Intent(CounterKind::Reset)).is_err());

        Middleware::<CounterState, CounterIntent>::dispose(&throttle);
        assert!(throttle.try_acquire(ActionKind::Intent(CounterKind::Reset)).is_ok());
    }
}
