//! Key-to-bucket mappers.
//!
//! A chooser maps every key to one bucket name out of a configured list. All
//! implementations are deterministic: two instances built from the same
//! bucket list map every key identically. They differ in lookup cost, table
//! size, and how many keys move when the bucket list changes.
//!
//! | chooser | lookup | movement on change |
//! |---|---|---|
//! | [`Ring`] | O(log N·V) | ~1/N on add/remove |
//! | [`Ketama`] | O(log N·V) | ~1/N on add/remove |
//! | [`Jump`] | O(log N), no table | 1/(N+1) on append only |
//! | [`Rendezvous`] | O(N) | minimal, any add/remove |
//! | [`Maglev`] | O(1) | ~1/N on add/remove |
//! | [`MultiProbe`] | O(K·N) | ~1/N on add/remove |
//!
//! [`Weighted`] wraps any of the above and skews the distribution by integer
//! weights.

use crate::error::KvError;

pub mod jump;
pub mod ketama;
pub mod maglev;
pub mod mpc;
pub mod rendezvous;
pub mod ring;
pub mod weighted;

pub use jump::Jump;
pub use ketama::Ketama;
pub use maglev::Maglev;
pub use mpc::MultiProbe;
pub use rendezvous::Rendezvous;
pub use ring::Ring;
pub use weighted::Weighted;

/// A configured key-to-bucket mapping.
///
/// `set_buckets` must succeed before `choose` is called. Tables built by
/// `set_buckets` are immutable afterwards; rebuilding is not required to be
/// safe concurrently with lookups (install a freshly built chooser instead,
/// e.g. via [`crate::ShardedKv::begin_migration`]).
pub trait Chooser: Send + Sync {
    /// (Re)build the internal tables for an ordered bucket list.
    ///
    /// Rebuilding with the same list yields a chooser that maps every key to
    /// the same bucket as before. Bucket order is significant for [`Jump`]
    /// and [`Maglev`]; the other choosers hash names and ignore order.
    fn set_buckets(&mut self, buckets: &[String]) -> Result<(), KvError>;

    /// Map a key to a bucket name from the configured list.
    ///
    /// # Panics
    ///
    /// May panic if called before a successful `set_buckets`.
    fn choose(&self, key: &str) -> &str;

    /// The configured bucket list, as passed to `set_buckets`.
    fn buckets(&self) -> &[String];
}
