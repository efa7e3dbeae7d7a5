//! Sequence code formatting and allocation.
//!
//! Transaction headers are numbered from a named counter stream. The counter
//! is an externally-owned resource reached only through [`CounterStore`];
//! there is no process-wide counter state in the core. The store's increment
//! must be a single atomic conditional update (increment-and-return, never
//! read-add-write), so concurrent allocations on one key can never observe
//! the same value.

use std::future::Future;

use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// The sequence key for transaction numbering.
pub const TRANSACTION_SEQ_KEY: &str = "transaction_seq";

/// Human-readable tag prefixed to transaction codes.
pub const TRANSACTION_TAG: &str = "TRANS";

/// A counter row as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// The sequence key this counter serves.
    pub key: String,
    /// Last allocated value; only ever increases.
    pub seq: i64,
    /// Width the value is left-zero-padded to.
    pub prefix_width: u32,
    /// Width the value is right-zero-padded to.
    pub suffix_width: u32,
}

/// A freshly allocated, formatted sequence code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedCode {
    /// The raw allocated integer.
    pub seq: i64,
    /// The rendered code, e.g. `TRANS/000420`.
    pub code: String,
}

/// Port to the persistence collaborator's atomic counter.
pub trait CounterStore {
    /// Atomically increments the named counter and returns the updated row.
    ///
    /// Must be linearizable per key: the returned `seq` is unique and
    /// strictly increasing across all concurrent callers.
    fn increment(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Counter, LedgerError>> + Send;
}

/// Left-pads the value with zeros to the given width.
#[must_use]
pub fn zero_pad(seq: i64, width: u32) -> String {
    format!("{seq:0>width$}", width = width as usize)
}

/// Right-pads the value with zeros to the given width.
#[must_use]
pub fn zero_suffix(seq: i64, width: u32) -> String {
    format!("{seq:0<width$}", width = width as usize)
}

/// Renders a counter value as a formatted code.
#[must_use]
pub fn format_code(tag: &str, counter: &Counter) -> String {
    format!(
        "{tag}/{}{}",
        zero_pad(counter.seq, counter.prefix_width),
        zero_suffix(counter.seq, counter.suffix_width)
    )
}

/// Hands out unique, formatted sequence codes.
#[derive(Debug, Clone)]
pub struct SequenceAllocator<S> {
    store: S,
    tag: &'static str,
}

impl<S: CounterStore> SequenceAllocator<S> {
    /// Creates an allocator over a counter store with a fixed tag.
    pub const fn new(store: S, tag: &'static str) -> Self {
        Self { store, tag }
    }

    /// Allocates the next value for `key` and renders its code.
    ///
    /// On increment failure the enclosing creation must abort: a header is
    /// never persisted without a code. A gap from an aborted creation after
    /// a successful increment is tolerated; a duplicate never is.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SequenceUnavailable`] when the increment fails.
    pub async fn allocate(&self, key: &str) -> Result<AllocatedCode, LedgerError> {
        let counter = self.store.increment(key).await?;
        Ok(AllocatedCode {
            seq: counter.seq,
            code: format_code(self.tag, &counter),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_zero_pad() {
        assert_eq!(zero_pad(42, 5), "00042");
        assert_eq!(zero_pad(42, 0), "42");
        assert_eq!(zero_pad(123_456, 3), "123456");
    }

    #[test]
    fn test_zero_suffix() {
        assert_eq!(zero_suffix(42, 5), "42000");
        assert_eq!(zero_suffix(42, 0), "42");
        assert_eq!(zero_suffix(123_456, 3), "123456");
    }

    #[test]
    fn test_format_code() {
        let counter = Counter {
            key: TRANSACTION_SEQ_KEY.into(),
            seq: 7,
            prefix_width: 4,
            suffix_width: 2,
        };
        assert_eq!(format_code(TRANSACTION_TAG, &counter), "TRANS/000770");
    }

    /// In-memory store whose increment holds a lock for the whole
    /// read-modify-return, matching the atomicity the real store provides.
    #[derive(Clone, Default)]
    struct MemCounterStore {
        counters: Arc<Mutex<HashMap<String, i64>>>,
        fail: bool,
    }

    impl CounterStore for MemCounterStore {
        async fn increment(&self, key: &str) -> Result<Counter, LedgerError> {
            if self.fail {
                return Err(LedgerError::SequenceUnavailable("store down".into()));
            }
            let mut counters = self.counters.lock().unwrap();
            let seq = counters.entry(key.to_owned()).or_insert(0);
            *seq += 1;
            Ok(Counter {
                key: key.to_owned(),
                seq: *seq,
                prefix_width: 5,
                suffix_width: 0,
            })
        }
    }

    #[tokio::test]
    async fn test_allocate_renders_code() {
        let allocator = SequenceAllocator::new(MemCounterStore::default(), TRANSACTION_TAG);
        let first = allocator.allocate(TRANSACTION_SEQ_KEY).await.unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(first.code, "TRANS/00001");
    }

    #[tokio::test]
    async fn test_allocate_failure_surfaces_sequence_unavailable() {
        let store = MemCounterStore {
            fail: true,
            ..MemCounterStore::default()
        };
        let allocator = SequenceAllocator::new(store, TRANSACTION_TAG);
        let result = allocator.allocate(TRANSACTION_SEQ_KEY).await;
        assert!(matches!(result, Err(LedgerError::SequenceUnavailable(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_allocations_are_distinct_and_contiguous() {
        let allocator = Arc::new(SequenceAllocator::new(
            MemCounterStore::default(),
            TRANSACTION_TAG,
        ));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let allocator = Arc::clone(&allocator);
            handles.push(tokio::spawn(async move {
                allocator.allocate(TRANSACTION_SEQ_KEY).await.unwrap().seq
            }));
        }

        let mut seqs = Vec::new();
        for handle in handles {
            seqs.push(handle.await.unwrap());
        }
        seqs.sort_unstable();

        // Contiguous ascending run, no duplicates.
        let expected: Vec<i64> = (1..=64).collect();
        assert_eq!(seqs, expected);
    }

    #[tokio::test]
    async fn test_streams_are_independent_per_key() {
        let allocator = SequenceAllocator::new(MemCounterStore::default(), TRANSACTION_TAG);
        let a = allocator.allocate("stream_a").await.unwrap();
        let b = allocator.allocate("stream_b").await.unwrap();
        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 1);
    }
}
