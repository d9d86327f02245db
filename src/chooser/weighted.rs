//! Integer weighting on top of any chooser.
//!
//! A bucket of weight `w` is fed to the inner chooser as `w` expanded names
//! `"<bucket>#0" .. "<bucket>#<w-1>"`; lookups strip the suffix at the last
//! `#`. A weight of zero removes the bucket entirely. `#` is therefore
//! reserved and rejected in user-facing bucket names.

use crate::chooser::Chooser;
use crate::error::KvError;

pub struct Weighted<C, F> {
    inner: C,
    weight: F,
    buckets: Vec<String>,
}

impl<C, F> Weighted<C, F>
where
    C: Chooser,
    F: Fn(&str) -> u32 + Send + Sync,
{
    /// Wrap `inner`, weighting each bucket by `weight(name)`.
    pub fn new(inner: C, weight: F) -> Self {
        Weighted {
            inner,
            weight,
            buckets: Vec::new(),
        }
    }
}

impl<C, F> Chooser for Weighted<C, F>
where
    C: Chooser,
    F: Fn(&str) -> u32 + Send + Sync,
{
    fn set_buckets(&mut self, buckets: &[String]) -> Result<(), KvError> {
        let mut expanded = Vec::new();
        for name in buckets {
            if name.contains('#') {
                return Err(KvError::ReservedDelimiter(name.clone()));
            }
            for i in 0..(self.weight)(name) {
                expanded.push(format!("{name}#{i}"));
            }
        }
        // All-zero weights leave nothing to route to; surfaced by the inner
        // chooser as an empty list.
        self.inner.set_buckets(&expanded)?;
        self.buckets = buckets.to_vec();
        Ok(())
    }

    fn choose(&self, key: &str) -> &str {
        let inner_name = self.inner.choose(key);
        match inner_name.rsplit_once('#') {
            Some((name, _)) => name,
            None => inner_name,
        }
    }

    fn buckets(&self) -> &[String] {
        &self.buckets
    }
}
