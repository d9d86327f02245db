use std::fmt;
use thiserror::Error;

/// Opaque failure produced by a concrete backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum KvError {
    /// The fail-fast wrapper refused the call because the backend is inside
    /// its backoff window. Callers should stop hammering the shard until the
    /// window has elapsed.
    #[error("backing off")]
    BackingOff,

    /// A chooser was asked to build from an empty bucket list.
    #[error("no buckets configured")]
    NoBuckets,

    /// A bucket name contains the reserved weight delimiter `#`.
    #[error("bucket name {0:?} contains reserved delimiter '#'")]
    ReservedDelimiter(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a backend, passed through untouched.
    #[error("{0}")]
    Backend(BackendError),

    /// More replicas failed than the replica wrapper was configured to
    /// tolerate. Carries every per-replica failure.
    #[error("{0}")]
    Replica(MultiError),
}

/// Collected `(replica index, error)` pairs from a replicated operation.
#[derive(Debug, Default)]
pub struct MultiError(pub Vec<(usize, KvError)>);

impl MultiError {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, KvError)> {
        self.0.iter()
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} replica failure(s):", self.0.len())?;
        for (idx, err) in &self.0 {
            write!(f, " [replica {idx}] {err};")?;
        }
        Ok(())
    }
}
