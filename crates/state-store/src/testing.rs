//! Counter fixtures shared by unit tests

use crate::action::Intent;
use crate::reducer::Reducer;
use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterState {
    pub counter: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterIntent {
    Increment(i64),
    Decrement(i64),
    Reset,
    /// Reducer returns the state unchanged
    Noop,
    /// Reducer returns an error
    Fail,
    /// Reducer panics
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Increment,
    Decrement,
    Reset,
    Noop,
    Fail,
    Panic,
}

impl Intent for CounterIntent {
    type Kind = CounterKind;

    fn kind(&self) -> CounterKind {
        match self {
            CounterIntent::Increment(_) => CounterKind::Increment,
            CounterIntent::Decrement(_) => CounterKind::Decrement,
            CounterIntent::Reset => CounterKind::Reset,
            CounterIntent::Noop => CounterKind::Noop,
            CounterIntent::Fail => CounterKind::Fail,
            CounterIntent::Panic => CounterKind::Panic,
        }
    }
}

fn reduce(state: &CounterState, intent: &CounterIntent) -> anyhow::Result<CounterState> {
    match intent {
        CounterIntent::Increment(n) => Ok(CounterState {
            counter: state.counter + n,
        }),
        CounterIntent::Decrement(n) => Ok(CounterState {
            counter: state.counter - n,
        }),
        CounterIntent::Reset => Ok(CounterState::default()),
        CounterIntent::Noop => Ok(state.clone()),
        CounterIntent::Fail => anyhow::bail!("refusing to fail quietly"),
        CounterIntent::Panic => panic!("reducer panicked on purpose"),
    }
}

pub fn counter_reducer() -> impl Reducer<CounterState, CounterIntent> {
    reduce
}

pub fn counter_store() -> Store<CounterState, CounterIntent> {
    Store::new(CounterState::default(), counter_reducer())
}
