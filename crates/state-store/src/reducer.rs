//! Reducer contract
//!
//! A reducer is the only thing allowed to produce a new state. It borrows the
//! current state and returns the next one:
//! - return a value equal to `state` when the intent changes nothing
//!   (the store then skips the broadcast and the history push)
//! - return a new value otherwise
//!
//! Reducers may fail. The error travels back up the middleware chain to
//! whoever called `next`, and finally to the `dispatch` caller unless an
//! error boundary absorbs it.

use crate::action::Intent;
use std::fmt;
use std::marker::PhantomData;

/// Bounds every store state must satisfy
///
/// `PartialEq` drives no-op detection in the terminal stage. States wrapping
/// shared data (e.g. `Arc`) can compare by pointer if that is what
/// "changed" means for them.
pub trait State: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> State for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

/// Pure state transition `(state, intent) -> state`
pub trait Reducer<S, I>: Send + Sync + 'static {
    fn reduce(&self, state: &S, intent: &I) -> anyhow::Result<S>;
}

impl<S, I, F> Reducer<S, I> for F
where
    F: Fn(&S, &I) -> anyhow::Result<S> + Send + Sync + 'static,
{
    fn reduce(&self, state: &S, intent: &I) -> anyhow::Result<S> {
        self(state, intent)
    }
}

/// Adapter for reducers that cannot fail
pub struct FnReducer<F, S, I> {
    f: F,
    _marker: PhantomData<fn(&S, &I) -> S>,
}

impl<F, S, I> Reducer<S, I> for FnReducer<F, S, I>
where
    F: Fn(&S, &I) -> S + Send + Sync + 'static,
    S: State,
    I: Intent,
{
    fn reduce(&self, state: &S, intent: &I) -> anyhow::Result<S> {
        Ok((self.f)(state, intent))
    }
}

/// Wrap an infallible `Fn(&S, &I) -> S` as a [`Reducer`]
pub fn from_fn<F, S, I>(f: F) -> FnReducer<F, S, I>
where
    F: Fn(&S, &I) -> S + Send + Sync + 'static,
{
    FnReducer {
        f,
        _marker: PhantomData,
    }
}
