//! ConditionalMiddleware - forwards actions only when state allows it
//!
//! The predicate reads the store's state at the moment the action passes
//! through, not when it was created.

use super::{kind_label, Middleware, Next};
use crate::action::{Action, Intent};
use crate::error::StoreError;
use crate::reducer::State;
use crate::sink::{Notice, NoticeSink};
use crate::store::Store;

type Condition<S, I> = dyn Fn(&S, &Action<S, I>) -> bool + Send + Sync;

pub struct ConditionalMiddleware<S, I> {
    condition: Box<Condition<S, I>>,
    notice_sink: Option<NoticeSink>,
}

impl<S, I> ConditionalMiddleware<S, I> {
    pub fn new<F>(condition: F) -> Self
    where
        F: Fn(&S, &Action<S, I>) -> bool + Send + Sync + 'static,
    {
        Self {
            condition: Box::new(condition),
            notice_sink: None,
        }
    }

    /// Report suppressed actions
    pub fn with_notice_sink(mut self, sink: NoticeSink) -> Self {
        self.notice_sink = Some(sink);
        self
    }
}

impl<S: State, I: Intent> Middleware<S, I> for ConditionalMiddleware<S, I> {
    fn handle(
        &self,
        store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        let state = store.state();
        if (self.condition)(&state, &action) {
            return next.run(action);
        }

        if let Some(sink) = &self.notice_sink {
            sink(&Notice::Suppressed {
                kind: kind_label(&action),
            });
        }
        Ok(())
    }
}
