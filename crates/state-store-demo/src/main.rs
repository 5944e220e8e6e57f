//! Counter demo
//!
//! Wires every built-in middleware around a tiny counter reducer and replays
//! a scripted session: batches, a throttled reset, debounced input, async
//! work, a failing action and a walk back through history.
//!
//! Usage: `state-store-demo [config.toml]` (defaults to `state-store.toml`)

use state_store::middleware::{
    AsyncMiddleware, BatchMiddleware, ConditionalMiddleware, DebounceMiddleware,
    ErrorBoundaryMiddleware, LoggingMiddleware, PerformanceMiddleware, ThrottleMiddleware,
};
use state_store::{Action, Intent, Store, StoreConfig};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
struct CounterState {
    counter: i64,
}

#[derive(Debug, Clone)]
enum CounterIntent {
    Increment(i64),
    Decrement(i64),
    Reset,
    /// Typed-in value, debounced
    Set(i64),
    /// Fails for zero
    Divide(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CounterKind {
    Increment,
    Decrement,
    Reset,
    Set,
    Divide,
}

impl Intent for CounterIntent {
    type Kind = CounterKind;

    fn kind(&self) -> CounterKind {
        match self {
            CounterIntent::Increment(_) => CounterKind::Increment,
            CounterIntent::Decrement(_) => CounterKind::Decrement,
            CounterIntent::Reset => CounterKind::Reset,
            CounterIntent::Set(_) => CounterKind::Set,
            CounterIntent::Divide(_) => CounterKind::Divide,
        }
    }
}

/// Reducer - pure function that produces new state from current state + intent
fn reduce(state: &CounterState, intent: &CounterIntent) -> anyhow::Result<CounterState> {
    let counter = match intent {
        CounterIntent::Increment(n) => state.counter + n,
        CounterIntent::Decrement(n) => state.counter - n,
        CounterIntent::Reset => 0,
        CounterIntent::Set(n) => *n,
        CounterIntent::Divide(0) => anyhow::bail!("cannot divide {} by zero", state.counter),
        CounterIntent::Divide(n) => state.counter / n,
    };

    if counter == state.counter {
        return Ok(state.clone());
    }
    Ok(CounterState { counter })
}

fn build_store(config: &StoreConfig) -> Store<CounterState, CounterIntent> {
    // Add middleware in order (the first one wraps all the others)
    Store::builder(CounterState::default(), reduce)
        .with_config(config)
        .add_middleware(ErrorBoundaryMiddleware::new())
        .add_middleware(LoggingMiddleware::timestamped())
        .add_middleware(PerformanceMiddleware::from_config(&config.middleware))
        .add_middleware(BatchMiddleware::new())
        .add_middleware(AsyncMiddleware::new())
        .add_middleware(ConditionalMiddleware::new(
            |state: &CounterState, action: &Action<CounterState, CounterIntent>| {
                // Never go below zero
                !matches!(
                    action.as_intent(),
                    Some(CounterIntent::Decrement(n)) if *n > state.counter
                )
            },
        ))
        .add_middleware(
            ThrottleMiddleware::<CounterIntent>::from_config(&config.middleware)
                .only([CounterKind::Reset]),
        )
        .add_middleware(
            DebounceMiddleware::<CounterIntent>::from_config(&config.middleware)
                .only([CounterKind::Set]),
        )
        .build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "state-store.toml".to_string());
    let mut config = StoreConfig::load_or_default(&config_path);
    config.history.enabled = true;

    log::info!("Starting state-store-demo");
    let store = build_store(&config);

    let mut changes = store.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(state) = changes.recv().await {
            println!("counter = {}", state.counter);
        }
    });

    store.dispatch(Action::batch(vec![
        Action::intent(CounterIntent::Increment(1)),
        Action::intent(CounterIntent::Increment(10)),
        Action::intent(CounterIntent::Decrement(5)),
    ]))?;

    // Below zero, suppressed
    store.dispatch_intent(CounterIntent::Decrement(100))?;

    // Absorbed by the error boundary
    store.dispatch_intent(CounterIntent::Divide(0))?;

    // Simulated typing: only the last value lands
    for value in [4, 42, 420] {
        store.dispatch_intent(CounterIntent::Set(value))?;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::sleep(config.middleware.debounce() + Duration::from_millis(50)).await;

    store.dispatch(Action::run_async("fetch-bonus", |store| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.dispatch_intent(CounterIntent::Increment(80))?;
        Ok(())
    }))?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Second reset inside the throttle window is dropped
    store.dispatch_intent(CounterIntent::Reset)?;
    store.dispatch_intent(CounterIntent::Increment(7))?;
    store.dispatch_intent(CounterIntent::Reset)?;

    println!("-- undo --");
    while store.undo()? {}
    println!("-- redo --");
    while store.redo()? {}

    println!(
        "final counter = {}, {} actions logged, {} states in history",
        store.state().counter,
        store.action_log().len(),
        store.history_len()
    );

    store.dispose();
    printer.await?;

    log::info!("Exiting state-store-demo");
    Ok(())
}
