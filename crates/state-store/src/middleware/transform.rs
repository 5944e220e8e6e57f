//! TransformMiddleware - rewrites actions before they go further

use super::{kind_label, Middleware, Next};
use crate::action::{Action, Intent};
use crate::error::StoreError;
use crate::reducer::State;
use crate::sink::{Notice, NoticeSink};
use crate::store::Store;

/// Outcome of a transform function
#[derive(Debug)]
pub enum Transform<S, I> {
    /// Forward the original action
    Unchanged,
    /// Forward this action instead of the original
    Replace(Action<S, I>),
    /// Forward nothing
    Suppress,
}

type TransformFn<S, I> = dyn Fn(&Action<S, I>) -> Transform<S, I> + Send + Sync;

pub struct TransformMiddleware<S, I> {
    transform: Box<TransformFn<S, I>>,
    notice_sink: Option<NoticeSink>,
}

impl<S, I> TransformMiddleware<S, I> {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&Action<S, I>) -> Transform<S, I> + Send + Sync + 'static,
    {
        Self {
            transform: Box::new(transform),
            notice_sink: None,
        }
    }

    /// Report suppressed actions
    pub fn with_notice_sink(mut self, sink: NoticeSink) -> Self {
        self.notice_sink = Some(sink);
        self
    }
}

impl<S: State, I: Intent> Middleware<S, I> for TransformMiddleware<S, I> {
    fn handle(
        &self,
        _store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        match (self.transform)(&action) {
            Transform::Unchanged => next.run(action),
            Transform::Replace(replacement) => {
                log::trace!(
                    "TransformMiddleware: {} -> {}",
                    kind_label(&action),
                    kind_label(&replacement)
                );
                next.run(replacement)
            }
            Transform::Suppress => {
                if let Some(sink) = &self.notice_sink {
                    sink(&Notice::Transformed {
                        kind: kind_label(&action),
                    });
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{counter_reducer, CounterIntent, CounterState};

    type TestAction = Action<CounterState, CounterIntent>;

    fn clamp_store() -> Store<CounterState, CounterIntent> {
        // Cap increments at 10, turn negative decrements into nothing
        Store::builder(CounterState::default(), counter_reducer())
            .add_middleware(TransformMiddleware::new(|action: &TestAction| {
                match action.as_intent() {
                    Some(CounterIntent::Increment(n)) if *n > 10 => {
                        Transform::Replace(Action::intent(CounterIntent::Increment(10)))
                    }
                    Some(CounterIntent::Decrement(n)) if *n < 0 => Transform::Suppress,
                    _ => Transform::Unchanged,
                }
            }))
            .build()
    }

    #[test]
    fn test_replace_forwards_only_replacement() {
        let store = clamp_store();
        store.dispatch_intent(CounterIntent::Increment(50)).unwrap();
        assert_eq!(store.state().counter, 10);

        // The log keeps what the caller dispatched
        assert!(matches!(
            store.action_log()[0].as_intent(),
            Some(CounterIntent::Increment(50))
        ));
    }

    #[test]
    fn test_unchanged_forwards_original() {
        let store = clamp_store();
        store.dispatch_intent(CounterIntent::Increment(4)).unwrap();
        store.dispatch_intent(CounterIntent::Decrement(1)).unwrap();
        assert_eq!(store.state().counter, 3);
    }

    #[test]
    fn test_suppress_forwards_nothing() {
        let store = clamp_store();
        store.dispatch_intent(CounterIntent::Decrement(-5)).unwrap();
        assert_eq!(store.state().counter, 0);
    }
}
