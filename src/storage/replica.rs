//! Replicated storage with hedged reads.
//!
//! Reads pick two distinct replicas at random and hedge: the first request
//! gets `hedge_timeout` to answer before the second is issued, bounding tail
//! latency at the cost of roughly doubling backend load for slow requests.
//! Writes and connection resets fan out to every replica in parallel;
//! deletes run serially and OR their "existed" results.
//!
//! Failures are collected per replica. An operation only surfaces a
//! [`KvError::Replica`] multi-error when more than `max_failures` replicas
//! failed, so with a tolerant configuration a missing key stays a miss even
//! if one replica was down.

use crate::error::{KvError, MultiError};
use crate::storage::Storage;
use crossbeam_channel::{bounded, RecvTimeoutError};
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How long the first read may take before the hedge fires.
pub const DEFAULT_HEDGE_TIMEOUT: Duration = Duration::from_secs(1);

type GetResult = Result<Option<Vec<u8>>, KvError>;

pub struct Replica {
    replicas: Vec<Arc<dyn Storage>>,
    max_failures: usize,
    hedge_timeout: Duration,
}

impl Replica {
    /// A replicated store over `replicas`, tolerating up to `max_failures`
    /// failed replicas per operation before errors surface.
    ///
    /// # Panics
    ///
    /// Panics if `replicas` is empty.
    pub fn new(max_failures: usize, replicas: Vec<Arc<dyn Storage>>) -> Self {
        assert!(!replicas.is_empty(), "replica set must not be empty");
        Replica {
            replicas,
            max_failures,
            hedge_timeout: DEFAULT_HEDGE_TIMEOUT,
        }
    }

    /// Override the hedge timeout. Defaults to [`DEFAULT_HEDGE_TIMEOUT`].
    pub fn with_hedge_timeout(mut self, hedge_timeout: Duration) -> Self {
        self.hedge_timeout = hedge_timeout;
        self
    }

    /// Two distinct replica indices, uniformly at random.
    fn pick_pair(&self) -> (usize, usize) {
        let n = self.replicas.len();
        let mut rng = rand::thread_rng();
        let first = rng.gen_range(0..n);
        let mut second = rng.gen_range(0..n - 1);
        if second >= first {
            second += 1;
        }
        (first, second)
    }

    fn spawn_get(&self, idx: usize, key: &str, tx: crossbeam_channel::Sender<(usize, GetResult)>) {
        let store = Arc::clone(&self.replicas[idx]);
        let key = key.to_string();
        thread::spawn(move || {
            // the channel is buffered, so a late loser parks its result and
            // exits instead of leaking
            let _ = tx.send((idx, store.get(&key)));
        });
    }

    /// First success wins; otherwise collect errors and apply the
    /// `max_failures` threshold.
    fn settle(&self, results: Vec<(usize, GetResult)>) -> GetResult {
        let mut errors = Vec::new();
        for (idx, result) in results {
            match result {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => {}
                Err(e) => errors.push((idx, e)),
            }
        }
        if errors.len() > self.max_failures {
            Err(KvError::Replica(MultiError(errors)))
        } else {
            Ok(None)
        }
    }

    fn surface_errors(&self, errors: Vec<(usize, KvError)>) -> Result<(), KvError> {
        if errors.len() > self.max_failures {
            Err(KvError::Replica(MultiError(errors)))
        } else {
            Ok(())
        }
    }

    /// Run `op` against every replica in parallel and collect per-replica
    /// outcomes in replica order.
    fn fan_out<F>(&self, op: F) -> Vec<(usize, Result<(), KvError>)>
    where
        F: Fn(&dyn Storage) -> Result<(), KvError> + Sync,
    {
        let (tx, rx) = bounded(self.replicas.len());
        thread::scope(|scope| {
            for (idx, replica) in self.replicas.iter().enumerate() {
                let tx = tx.clone();
                let op = &op;
                scope.spawn(move || {
                    let _ = tx.send((idx, op(replica.as_ref())));
                });
            }
        });
        drop(tx);
        let mut results: Vec<_> = rx.iter().collect();
        results.sort_by_key(|(idx, _)| *idx);
        results
    }
}

impl Storage for Replica {
    fn get(&self, key: &str) -> GetResult {
        if self.replicas.len() == 1 {
            return self.replicas[0].get(key);
        }

        let (first_idx, second_idx) = self.pick_pair();
        let (tx, rx) = bounded(2);

        self.spawn_get(first_idx, key, tx.clone());
        match rx.recv_timeout(self.hedge_timeout) {
            Ok((idx, result)) => {
                if matches!(result, Ok(Some(_))) {
                    return result;
                }
                // miss or error: ask the other replica and wait it out
                self.spawn_get(second_idx, key, tx);
                let second = match rx.recv() {
                    Ok(r) => r,
                    Err(_) => (second_idx, Ok(None)),
                };
                self.settle(vec![(idx, result), second])
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                // hedge: race both replicas, take the first success
                self.spawn_get(second_idx, key, tx);
                let quick = match rx.recv() {
                    Ok(r) => r,
                    Err(_) => (first_idx, Ok(None)),
                };
                if matches!(quick.1, Ok(Some(_))) {
                    return quick.1;
                }
                let slow = match rx.recv() {
                    Ok(r) => r,
                    Err(_) => (second_idx, Ok(None)),
                };
                self.settle(vec![quick, slow])
            }
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        let errors = self
            .fan_out(|replica| replica.set(key, value))
            .into_iter()
            .filter_map(|(idx, r)| r.err().map(|e| (idx, e)))
            .collect();
        self.surface_errors(errors)
    }

    fn delete(&self, key: &str) -> Result<bool, KvError> {
        let mut existed = false;
        let mut errors = Vec::new();
        for (idx, replica) in self.replicas.iter().enumerate() {
            match replica.delete(key) {
                Ok(ok) => existed = existed || ok,
                Err(e) => errors.push((idx, e)),
            }
        }
        self.surface_errors(errors)?;
        Ok(existed)
    }

    fn reset_connection(&self, key: &str) -> Result<(), KvError> {
        let errors = self
            .fan_out(|replica| replica.reset_connection(key))
            .into_iter()
            .filter_map(|(idx, r)| r.err().map(|e| (idx, e)))
            .collect();
        self.surface_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::storagetest::{storage_suite, Discard, ErrStore, SlowStore};
    use crate::storage::Memory;

    fn two(a: impl Storage + 'static, b: impl Storage + 'static) -> Vec<Arc<dyn Storage>> {
        vec![Arc::new(a), Arc::new(b)]
    }

    #[test]
    fn single_replica_delegates() {
        storage_suite(&Replica::new(0, vec![Arc::new(Memory::new())]));
    }

    #[test]
    fn success_bubbles_past_a_discarding_replica() {
        // one replica remembers nothing; every get must still find the value
        for _ in 0..10 {
            storage_suite(&Replica::new(0, two(Discard, Memory::new())));
            storage_suite(&Replica::new(0, two(Memory::new(), Discard)));
        }
    }

    #[test]
    fn errors_are_absorbed_within_max_failures() {
        for _ in 0..10 {
            storage_suite(&Replica::new(2, two(ErrStore, Memory::new())));
            storage_suite(&Replica::new(2, two(Memory::new(), ErrStore)));
        }
    }

    #[test]
    fn all_replicas_failing_surfaces_a_multi_error() {
        let replica = Replica::new(0, two(ErrStore, ErrStore));

        let expect_multi = |err: KvError, what: &str| match err {
            KvError::Replica(me) => assert_eq!(me.len(), 2, "{what}: {me}"),
            other => panic!("{what}: expected multi-error, got {other}"),
        };

        expect_multi(replica.get("hello").unwrap_err(), "get");
        expect_multi(replica.set("hello", b"world").unwrap_err(), "set");
        expect_multi(replica.delete("hello").unwrap_err(), "delete");
        expect_multi(replica.reset_connection("hello").unwrap_err(), "reset");
    }

    #[test]
    fn hedge_fires_on_a_slow_replica() {
        // replica 0 answers only after 500ms; with a 10ms hedge the read
        // must come back from the fast replica well before that
        let fast = Memory::new();
        fast.set("k", b"v").unwrap();
        let replica = Replica::new(
            0,
            two(SlowStore::new(Memory::new(), Duration::from_millis(500)), fast),
        )
        .with_hedge_timeout(Duration::from_millis(10));

        for _ in 0..5 {
            let begin = std::time::Instant::now();
            let got = replica.get("k").unwrap();
            assert_eq!(got.as_deref(), Some(&b"v"[..]));
            assert!(begin.elapsed() < Duration::from_millis(400));
        }
    }

    #[test]
    fn slow_replica_still_wins_when_it_is_the_only_holder() {
        // only the slow replica has the value; the hedge must wait it out
        let holder = Memory::new();
        holder.set("k", b"v").unwrap();
        let replica = Replica::new(
            0,
            two(SlowStore::new(holder, Duration::from_millis(50)), Discard),
        )
        .with_hedge_timeout(Duration::from_millis(5));

        for _ in 0..5 {
            assert_eq!(replica.get("k").unwrap().as_deref(), Some(&b"v"[..]));
        }
    }

    #[test]
    fn writes_reach_every_replica() {
        let a = Arc::new(Memory::new());
        let b = Arc::new(Memory::new());
        let replica = Replica::new(0, vec![a.clone(), b.clone()]);

        replica.set("k", b"v").unwrap();
        assert_eq!(a.get("k").unwrap().as_deref(), Some(&b"v"[..]));
        assert_eq!(b.get("k").unwrap().as_deref(), Some(&b"v"[..]));

        assert!(replica.delete("k").unwrap());
        assert_eq!(a.get("k").unwrap(), None);
        assert_eq!(b.get("k").unwrap(), None);
    }

    #[test]
    fn pick_pair_is_always_distinct() {
        let replica = Replica::new(
            0,
            vec![
                Arc::new(Memory::new()) as Arc<dyn Storage>,
                Arc::new(Memory::new()),
                Arc::new(Memory::new()),
            ],
        );
        for _ in 0..1000 {
            let (a, b) = replica.pick_pair();
            assert_ne!(a, b);
            assert!(a < 3 && b < 3);
        }
    }
}
