//! Mempool snapshot channel.
//!
//! The read service does not own a mempool. Whatever component does publishes
//! an ordered list of pending [`TransactionRecord`]s through a
//! [`MempoolWriter`]; gRPC handlers read it through a cloned
//! [`MempoolReader`].
//!
//! Uses ArcSwap so reads are wait-free and never contend with the writer. A
//! handler that loaded a snapshot keeps it alive until the response is built,
//! so every `GetFullMempool` answer comes from exactly one snapshot.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwap;

use crate::proto::TransactionRecord;

/// Immutable view of the pending transactions at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MempoolSnapshot {
    /// Pending transactions in publication order
    pub records: Vec<TransactionRecord>,
    /// Wall-clock time of publication, in milliseconds since the epoch
    pub published_at_ms: u64,
}

impl MempoolSnapshot {
    fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            published_at_ms: now_ms(),
        }
    }

    /// Returns the number of pending transactions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no pending transactions.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a pending transaction by id.
    pub fn get(&self, id: &str) -> Option<&TransactionRecord> {
        self.records.iter().find(|record| record.id == id)
    }
}

/// Lock-free reader for the published mempool snapshot.
#[derive(Clone)]
pub struct MempoolReader {
    inner: Arc<ArcSwap<MempoolSnapshot>>,
}

impl MempoolReader {
    /// Create a new reader/writer pair with an empty snapshot.
    pub fn new() -> (Self, MempoolWriter) {
        let shared = Arc::new(ArcSwap::from_pointee(MempoolSnapshot::new(Vec::new())));
        (
            Self {
                inner: Arc::clone(&shared),
            },
            MempoolWriter { inner: shared },
        )
    }

    /// Load the current snapshot.
    pub fn load(&self) -> Arc<MempoolSnapshot> {
        self.inner.load_full()
    }

    /// Number of records in the current snapshot.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Returns true if the current snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}

/// Writer for the mempool snapshot (held by the mempool owner).
pub struct MempoolWriter {
    inner: Arc<ArcSwap<MempoolSnapshot>>,
}

impl MempoolWriter {
    /// Replace the snapshot with `records`, keeping their order.
    pub fn publish(&self, records: Vec<TransactionRecord>) {
        self.inner.store(Arc::new(MempoolSnapshot::new(records)));
    }

    /// Append one record to the end of the snapshot.
    pub fn push(&self, record: TransactionRecord) {
        self.inner.rcu(|current| {
            let mut records = current.records.clone();
            records.push(record.clone());
            MempoolSnapshot::new(records)
        });
    }

    /// Drop every record with the given id. Returns how many were removed.
    pub fn remove(&self, id: &str) -> usize {
        let mut removed = 0;
        self.inner.rcu(|current| {
            let records: Vec<TransactionRecord> = current
                .records
                .iter()
                .filter(|record| record.id != id)
                .cloned()
                .collect();
            removed = current.records.len() - records.len();
            MempoolSnapshot::new(records)
        });
        removed
    }

    /// Publish an empty snapshot.
    pub fn clear(&self) {
        self.publish(Vec::new());
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
