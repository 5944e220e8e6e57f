//! BatchMiddleware - expands batch actions into individual dispatches
//!
//! Each child goes through the full `Store::dispatch` path, so it is logged
//! and seen by every middleware from the top. Children run in order before
//! the batch dispatch returns; async children are handed to the async
//! middleware like any other async action.

use super::{Middleware, Next};
use crate::action::{Action, Intent};
use crate::error::StoreError;
use crate::reducer::State;
use crate::store::Store;

pub struct BatchMiddleware;

impl BatchMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BatchMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, I: Intent> Middleware<S, I> for BatchMiddleware {
    fn handle(
        &self,
        store: &Store<S, I>,
        action: Action<S, I>,
        next: Next<S, I>,
    ) -> Result<(), StoreError> {
        match action.into_batch() {
            Ok(actions) => {
                log::debug!("BatchMiddleware: dispatching {} action(s)", actions.len());
                for child in actions {
                    store.dispatch(child)?;
                }
                Ok(())
            }
            Err(action) => next.run(action),
        }
    }
}
