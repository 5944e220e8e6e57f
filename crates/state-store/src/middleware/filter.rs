//! FilterMiddleware - forwards only actions matching a predicate
//!
//! The predicate must be pure and total; it sees the action, not the state.
//! Use [`ConditionalMiddleware`](super::ConditionalMiddleware) when the
//! decision depends on current state.

use super::{kind_label, Middleware, Next};
use crate::action::{Action, Intent};
use crate::error::StoreError;
use crate::reducer::State;
use crate::sink::{Notice, NoticeSink};
use crate::store::Store;

type Predicate<S, I> = dyn Fn(&Action<S, I>) -> bool + Send + Sync;

pub struct FilterMiddleware<S, I> {
    predicate: Box<Predicate<S, I>>,
    notice_sink: Option<NoticeSink>,
}

impl<S, I> FilterMiddleware<S, I> {
    /// Keep actions for which `predicate` returns true
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Action<S, I>) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            notice_sink: None,
        }
    }

    /// Report dropped actions
    pub fn with_notice_sink(mut self, sink: NoticeSink) -> Self {
        self.notice_sink = Some(sink);
        self
    }
}

impl<S: State, I: Intent> Middleware<S, I> for FilterMiddleware<S, I> {
    fn handle(
        &self,
        _store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        if (self.predicate)(&action) {
            return next.run(action);
        }

        if let Some(sink) = &self.notice_sink {
            sink(&Notice::Filtered {
                kind: kind_label(&action),
            });
        }
        Ok(())
    }
}
