//! Fail-fast wrapper around a single backend.
//!
//! Tracks backend health across four states. A healthy backend (`Ok`) that
//! starts failing moves to `Warn`; after `max_warns` consecutive failures it
//! trips to `Fail` and calls are refused with [`KvError::BackingOff`] until
//! the backoff window elapses. The first call after the window runs as a
//! `Retry` probe: success resets everything to `Ok`, another failure re-trips
//! with the window doubled, up to `max_delay`.
//!
//! Composed under [`crate::storage::Replica`] this keeps a dead replica from
//! dragging every read through a connect timeout: the wrapper answers
//! immediately and the hedge falls over to a live replica.

use crate::error::KvError;
use crate::storage::Storage;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Ceiling for the doubling backoff window when none is configured.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Health {
    Ok,
    Warn,
    Fail,
    Retry,
}

#[derive(Debug)]
struct HealthState {
    health: Health,
    fails: u32,
    delay: Duration,
    skip_until: Option<Instant>,
}

impl HealthState {
    fn new() -> Self {
        HealthState {
            health: Health::Ok,
            fails: 0,
            delay: Duration::ZERO,
            skip_until: None,
        }
    }

    /// Gate a call. `Fail` refuses until the window elapses, then promotes
    /// itself to a single `Retry` probe.
    fn can_use(&mut self, now: Instant) -> Result<(), KvError> {
        match self.health {
            Health::Ok | Health::Warn | Health::Retry => Ok(()),
            Health::Fail => {
                if self.skip_until.is_some_and(|until| now < until) {
                    return Err(KvError::BackingOff);
                }
                self.health = Health::Retry;
                Ok(())
            }
        }
    }

    fn on_success(&mut self) {
        self.health = Health::Ok;
        self.fails = 0;
        self.delay = Duration::ZERO;
        self.skip_until = None;
    }

    fn on_failure(&mut self, now: Instant, max_warns: u32, max_delay: Duration) {
        match self.health {
            Health::Ok => {
                self.health = Health::Warn;
                self.fails = 1;
            }
            Health::Warn => {
                self.fails += 1;
                if max_warns == 0 || self.fails == max_warns {
                    self.health = Health::Fail;
                    self.delay = Duration::from_secs(1);
                    self.skip_until = Some(now + self.delay);
                    log::warn!("backend tripped, backing off {:?}", self.delay);
                }
            }
            Health::Retry => {
                self.health = Health::Fail;
                self.delay = (self.delay * 2).min(max_delay);
                self.skip_until = Some(now + self.delay);
                log::warn!("retry probe failed, backing off {:?}", self.delay);
            }
            // The gate either refuses a Fail-state call or promotes it to
            // Retry, so a failure cannot be reported from Fail.
            Health::Fail => {}
        }
    }
}

pub struct Backoff<S> {
    store: S,
    max_warns: u32,
    max_delay: Duration,
    state: Mutex<HealthState>,
    now: fn() -> Instant,
}

impl<S: Storage> Backoff<S> {
    /// Wrap `store` with `max_warns` tolerated consecutive failures.
    /// `max_warns` of zero trips on the failure after the first warning.
    pub fn new(store: S, max_warns: u32) -> Self {
        Backoff {
            store,
            max_warns,
            max_delay: DEFAULT_MAX_DELAY,
            state: Mutex::new(HealthState::new()),
            now: Instant::now,
        }
    }

    /// Cap the doubling backoff window. Defaults to [`DEFAULT_MAX_DELAY`].
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = if max_delay.is_zero() {
            DEFAULT_MAX_DELAY
        } else {
            max_delay
        };
        self
    }

    // The lock is released while the backend call runs; only the gate and
    // the outcome transition hold it.
    fn track<T>(&self, result: Result<T, KvError>) -> Result<T, KvError> {
        let mut state = self.state.lock();
        match &result {
            Ok(_) => state.on_success(),
            Err(_) => state.on_failure((self.now)(), self.max_warns, self.max_delay),
        }
        result
    }

    fn gate(&self) -> Result<(), KvError> {
        self.state.lock().can_use((self.now)())
    }
}

impl<S: Storage> Storage for Backoff<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        self.gate()?;
        self.track(self.store.get(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        self.gate()?;
        self.track(self.store.set(key, value))
    }

    fn delete(&self, key: &str) -> Result<bool, KvError> {
        self.gate()?;
        self.track(self.store.delete(key))
    }

    /// Resets health to `Ok` unconditionally: the caller is asserting the
    /// backend is recoverable.
    fn reset_connection(&self, key: &str) -> Result<(), KvError> {
        let result = self.store.reset_connection(key);
        self.state.lock().on_success();
        result
    }
}
