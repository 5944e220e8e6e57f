use crate::action::{Action, Intent, Payload};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::history::StateHistory;
use crate::middleware::Middleware;
use crate::reducer::{Reducer, State};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Redux-style Store that holds application state and dispatches actions
///
/// The Store follows the Redux pattern:
/// - Centralized state management
/// - Actions are dispatched to modify state
/// - Pure reducers handle state transitions
/// - State is immutable (replaced on each action)
///
/// `Store` is a cheap handle: clones share the same state, so middleware and
/// async work can hold one and dispatch back into the chain.
///
/// ```rust,ignore
/// let store = Store::builder(AppState::default(), reducer::from_fn(reduce))
///     .add_middleware(ErrorBoundaryMiddleware::new())
///     .add_middleware(BatchMiddleware::new())
///     .history(50)
///     .build();
///
/// store.dispatch(Action::intent(AppIntent::Increment(1)))?;
/// ```
pub struct Store<S, I> {
    inner: Arc<Inner<S, I>>,
}

struct Inner<S, I> {
    core: Mutex<Core<S, I>>,
    reducer: Box<dyn Reducer<S, I>>,
    chain: Arc<[Arc<dyn Middleware<S, I>>]>,
    disposed: AtomicBool,
}

/// Everything guarded by the single store lock
struct Core<S, I> {
    state: S,
    history: Option<StateHistory<S>>,
    action_log: VecDeque<Action<S, I>>,
    max_action_history: usize,
    /// One sender per live subscription, emptied on dispose
    subscribers: Vec<mpsc::UnboundedSender<S>>,
}

impl<S, I> Clone for Store<S, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, I> fmt::Debug for Store<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("middleware", &self.inner.chain.len())
            .field("disposed", &self.inner.disposed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<S: State, I: Intent> Store<S, I> {
    /// Create a store without middleware or history
    pub fn new(initial_state: S, reducer: impl Reducer<S, I>) -> Self {
        Self::builder(initial_state, reducer).build()
    }

    pub fn builder(initial_state: S, reducer: impl Reducer<S, I>) -> StoreBuilder<S, I> {
        StoreBuilder::new(initial_state, reducer)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> S {
        self.inner.core.lock().state.clone()
    }

    /// Process an action through middleware chain and reducer
    ///
    /// The action is appended to the action log before the chain runs, so
    /// dispatches from one caller are logged in call order. Re-entrant
    /// dispatch from middleware or async work goes through here as well.
    ///
    /// After [`dispose`](Self::dispose) this is a silent no-op.
    pub fn dispatch(&self, action: Action<S, I>) -> Result<(), StoreError> {
        if self.is_disposed() {
            log::trace!("Store disposed, ignoring {:?}", action.kind());
            return Ok(());
        }

        self.record(&action);
        Next::head(self.clone()).run(action)
    }

    /// Shorthand for `dispatch(Action::intent(intent))`
    pub fn dispatch_intent(&self, intent: I) -> Result<(), StoreError> {
        self.dispatch(Action::intent(intent))
    }

    fn record(&self, action: &Action<S, I>) {
        let mut core = self.inner.core.lock();
        core.action_log.push_back(action.clone());
        while core.action_log.len() > core.max_action_history {
            core.action_log.pop_front();
        }
    }

    /// Terminal stage: apply the reducer and publish the result if it changed
    fn commit(&self, action: Action<S, I>) -> Result<(), StoreError> {
        let intent = match action.payload() {
            Payload::Intent(intent) => intent,
            Payload::Async(work) => {
                log::debug!("Async action '{}' reached reducer, ignoring", work.label());
                return Ok(());
            }
            Payload::Batch(actions) => {
                log::debug!("Batch of {} reached reducer, ignoring", actions.len());
                return Ok(());
            }
        };

        if self.is_disposed() {
            return Ok(());
        }

        let mut core = self.inner.core.lock();
        let next = self
            .inner
            .reducer
            .reduce(&core.state, intent)
            .map_err(StoreError::Reducer)?;

        if next == core.state {
            return Ok(());
        }

        if let Some(history) = core.history.as_mut() {
            history.push(next.clone());
        }
        core.state = next;
        core.broadcast();
        Ok(())
    }

    /// Step back one state in history
    ///
    /// Returns `Ok(false)` when there is nothing to undo.
    pub fn undo(&self) -> Result<bool, StoreError> {
        self.travel(StateHistory::undo)
    }

    /// Step forward one state in history
    ///
    /// Returns `Ok(false)` when there is nothing to redo.
    pub fn redo(&self) -> Result<bool, StoreError> {
        self.travel(StateHistory::redo)
    }

    fn travel(&self, step: fn(&mut StateHistory<S>) -> Option<&S>) -> Result<bool, StoreError> {
        let mut core = self.inner.core.lock();
        let history = core.history.as_mut().ok_or(StoreError::HistoryDisabled)?;

        if self.is_disposed() {
            return Ok(false);
        }

        let Some(target) = step(history).cloned() else {
            return Ok(false);
        };
        core.state = target;
        core.broadcast();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.inner
            .core
            .lock()
            .history
            .as_ref()
            .is_some_and(StateHistory::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.inner
            .core
            .lock()
            .history
            .as_ref()
            .is_some_and(StateHistory::can_redo)
    }

    pub fn history_enabled(&self) -> bool {
        self.inner.core.lock().history.is_some()
    }

    /// Number of states in history (0 when history is disabled)
    pub fn history_len(&self) -> usize {
        self.inner
            .core
            .lock()
            .history
            .as_ref()
            .map_or(0, StateHistory::len)
    }

    /// Forget all history except the current state
    pub fn clear_history(&self) -> Result<(), StoreError> {
        let mut core = self.inner.core.lock();
        let current = core.state.clone();
        let history = core.history.as_mut().ok_or(StoreError::HistoryDisabled)?;
        history.clear();
        history.push(current);
        Ok(())
    }

    /// Read-only snapshot of the action log, oldest first
    pub fn action_log(&self) -> Vec<Action<S, I>> {
        self.inner.core.lock().action_log.iter().cloned().collect()
    }

    /// Subscribe to state changes
    ///
    /// The subscription yields the current state first, then every changed
    /// state in order. Nothing is dropped: each subscription buffers
    /// without bound until it is read.
    pub fn subscribe(&self) -> Subscription<S> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut core = self.inner.core.lock();
        // Seeded under the lock so no change can slip in before it
        let _ = tx.send(core.state.clone());
        if !self.is_disposed() {
            core.subscribers.push(tx);
        }
        Subscription { rx }
    }
}

impl<S, I> Store<S, I> {
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Tear the store down
    ///
    /// Closes the change stream and lets every middleware cancel its timers
    /// and in-flight work. Later dispatches are ignored. Calling this more
    /// than once is harmless.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            log::debug!("Store already disposed");
            return;
        }

        log::info!("Disposing store");
        self.inner.core.lock().subscribers.clear();
        for middleware in self.inner.chain.iter() {
            middleware.dispose();
        }
    }
}

impl<S: Clone, I> Core<S, I> {
    /// Send the current state to every subscriber, dropping closed ones
    fn broadcast(&mut self) {
        let state = &self.state;
        self.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
    }
}

/// Continuation handed to each middleware
///
/// Calling [`run`](Next::run) forwards the action to the rest of the chain
/// and finally to the reducer. Not calling it swallows the action. `Next` is
/// owned and `'static`, so middleware may hold on to it and call it later.
pub struct Next<S, I> {
    store: Store<S, I>,
    index: usize,
}

impl<S, I> Clone for Next<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            index: self.index,
        }
    }
}

impl<S, I> fmt::Debug for Next<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("index", &self.index).finish()
    }
}

impl<S: State, I: Intent> Next<S, I> {
    fn head(store: Store<S, I>) -> Self {
        Self { store, index: 0 }
    }

    pub fn run(&self, action: Action<S, I>) -> Result<(), StoreError> {
        match self.store.inner.chain.get(self.index) {
            Some(middleware) => {
                let next = Next {
                    store: self.store.clone(),
                    index: self.index + 1,
                };
                middleware.handle(&self.store, action, next)
            }
            None => self.store.commit(action),
        }
    }
}

/// Stream of state snapshots from [`Store::subscribe`]
///
/// Dropping it (or calling [`unsubscribe`](Self::unsubscribe)) cancels it.
#[derive(Debug)]
pub struct Subscription<S> {
    rx: mpsc::UnboundedReceiver<S>,
}

impl<S> Subscription<S> {
    /// Wait for the next state; `None` once the store is disposed and
    /// everything buffered has been read
    pub async fn recv(&mut self) -> Option<S> {
        self.rx.recv().await
    }

    /// Next state if one is already buffered
    pub fn try_recv(&mut self) -> Option<S> {
        self.rx.try_recv().ok()
    }

    /// Collect every buffered state
    pub fn drain(&mut self) -> Vec<S> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// True once the store dropped this subscription and nothing is buffered
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed() && self.rx.is_empty()
    }

    pub fn unsubscribe(self) {}
}

/// Builder for [`Store`]
///
/// Middleware runs in the order it was added: the first one added is the
/// outermost and sees every action before and after all the others.
pub struct StoreBuilder<S, I> {
    initial_state: S,
    reducer: Box<dyn Reducer<S, I>>,
    middleware: Vec<Arc<dyn Middleware<S, I>>>,
    history: Option<usize>,
    max_action_history: usize,
}

impl<S: State, I: Intent> StoreBuilder<S, I> {
    pub fn new(initial_state: S, reducer: impl Reducer<S, I>) -> Self {
        let defaults = StoreConfig::default();
        Self {
            initial_state,
            reducer: Box::new(reducer),
            middleware: Vec::new(),
            history: None,
            max_action_history: defaults.max_action_history,
        }
    }

    /// Add middleware to the store
    pub fn add_middleware<M: Middleware<S, I> + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Enable undo/redo with at most `max_size` states
    pub fn history(mut self, max_size: usize) -> Self {
        self.history = Some(max_size);
        self
    }

    pub fn without_history(mut self) -> Self {
        self.history = None;
        self
    }

    pub fn max_action_history(mut self, max: usize) -> Self {
        self.max_action_history = max;
        self
    }

    /// Apply history and action log settings from a config
    pub fn with_config(mut self, config: &StoreConfig) -> Self {
        self.history = config.history.enabled.then_some(config.history.max_size);
        self.max_action_history = config.max_action_history;
        self
    }

    pub fn build(self) -> Store<S, I> {
        let history = self.history.map(|max_size| {
            let mut history = StateHistory::new(max_size);
            history.push(self.initial_state.clone());
            history
        });

        log::debug!(
            "Building store with {} middleware, history {:?}",
            self.middleware.len(),
            self.history
        );

        Store {
            inner: Arc::new(Inner {
                core: Mutex::new(Core {
                    state: self.initial_state,
                    history,
                    action_log: VecDeque::new(),
                    max_action_history: self.max_action_history,
                    subscribers: Vec::new(),
                }),
                reducer: self.reducer,
                chain: self.middleware.into(),
                disposed: AtomicBool::new(false),
            }),
        }
    }
}
