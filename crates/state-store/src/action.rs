//! Actions - immutable intention records flowing through the store
//!
//! An [`Action`] wraps one of three payloads:
//! - `Intent`: a user-defined enum handled by the reducer
//! - `Async`: deferred work consumed by the async middleware
//! - `Batch`: a list of actions re-dispatched one by one by the batch middleware
//!
//! Every action records its creation time when it is built. There are no
//! setters; middleware that wants a different action builds a new one.

use crate::store::Store;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::Arc;

/// BoxFuture type alias for deferred async work
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// User-defined intent enum with a hashable kind discriminant
///
/// The kind is what throttle and debounce middleware key their timers on,
/// so two intents of the same kind with different payloads share a timer.
///
/// ```rust
/// use state_store::Intent;
///
/// #[derive(Debug, Clone)]
/// enum CounterIntent {
///     Increment(i64),
///     Reset,
/// }
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum CounterKind {
///     Increment,
///     Reset,
/// }
///
/// impl Intent for CounterIntent {
///     type Kind = CounterKind;
///
///     fn kind(&self) -> CounterKind {
///         match self {
///             CounterIntent::Increment(_) => CounterKind::Increment,
///             CounterIntent::Reset => CounterKind::Reset,
///         }
///     }
/// }
/// ```
pub trait Intent: Clone + fmt::Debug + Send + Sync + 'static {
    type Kind: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Discriminant of an [`Action`], used as a map key by timing middleware
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind<K> {
    Intent(K),
    Async,
    Batch,
}

type AsyncWork<S, I> = dyn Fn(Store<S, I>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// Deferred unit of work that receives a store handle and may dispatch
///
/// Only the async middleware runs it. Without that middleware the action
/// reaches the terminal stage and is treated as a no-op.
pub struct AsyncAction<S, I> {
    label: &'static str,
    work: Arc<AsyncWork<S, I>>,
}

impl<S, I> AsyncAction<S, I> {
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Start the work against the given store
    pub fn run(&self, store: Store<S, I>) -> BoxFuture<'static, anyhow::Result<()>> {
        (self.work)(store)
    }
}

impl<S, I> Clone for AsyncAction<S, I> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            work: Arc::clone(&self.work),
        }
    }
}

impl<S, I> fmt::Debug for AsyncAction<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// What an action carries
#[derive(Debug)]
pub enum Payload<S, I> {
    Intent(I),
    Async(AsyncAction<S, I>),
    Batch(Vec<Action<S, I>>),
}

impl<S, I: Clone> Clone for Payload<S, I> {
    fn clone(&self) -> Self {
        match self {
            Payload::Intent(intent) => Payload::Intent(intent.clone()),
            Payload::Async(work) => Payload::Async(work.clone()),
            Payload::Batch(actions) => Payload::Batch(actions.clone()),
        }
    }
}

/// Immutable action envelope with its creation timestamp
#[derive(Debug)]
pub struct Action<S, I> {
    created_at: DateTime<Utc>,
    payload: Payload<S, I>,
}

impl<S, I: Clone> Clone for Action<S, I> {
    fn clone(&self) -> Self {
        Self {
            created_at: self.created_at,
            payload: self.payload.clone(),
        }
    }
}

impl<S, I: Intent> Action<S, I> {
    /// Wrap a user intent
    pub fn intent(intent: I) -> Self {
        Self::from_payload(Payload::Intent(intent))
    }

    /// Group actions so the batch middleware dispatches them in order
    pub fn batch(actions: impl IntoIterator<Item = Action<S, I>>) -> Self {
        Self::from_payload(Payload::Batch(actions.into_iter().collect()))
    }

    /// Build an async action from a closure returning a future
    ///
    /// ```rust,ignore
    /// let load = Action::run_async("load", |store| async move {
    ///     store.dispatch(Action::intent(CounterIntent::Increment(1)))?;
    ///     Ok(())
    /// });
    /// ```
    pub fn run_async<F, Fut>(label: &'static str, work: F) -> Self
    where
        F: Fn(Store<S, I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let work: Arc<AsyncWork<S, I>> =
            Arc::new(move |store: Store<S, I>| -> BoxFuture<'static, anyhow::Result<()>> {
                Box::pin(work(store))
            });
        Self::from_payload(Payload::Async(AsyncAction { label, work }))
    }

    fn from_payload(payload: Payload<S, I>) -> Self {
        Self {
            created_at: Utc::now(),
            payload,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &Payload<S, I> {
        &self.payload
    }

    pub fn into_payload(self) -> Payload<S, I> {
        self.payload
    }

    /// The user intent, if this is an intent action
    pub fn as_intent(&self) -> Option<&I> {
        match &self.payload {
            Payload::Intent(intent) => Some(intent),
            _ => None,
        }
    }

    /// Split a batch into its children, or give the action back unchanged
    pub fn into_batch(self) -> Result<Vec<Action<S, I>>, Self> {
        match self.payload {
            Payload::Batch(actions) => Ok(actions),
            payload => Err(Self {
                created_at: self.created_at,
                payload,
            }),
        }
    }

    pub fn kind(&self) -> ActionKind<I::Kind> {
        match &self.payload {
            Payload::Intent(intent) => ActionKind::Intent(intent.kind()),
            Payload::Async(_) => ActionKind::Async,
            Payload::Batch(_) => ActionKind::Batch,
        }
    }
}
