//! The live snapshot and its lock.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::snapshot::Snapshot;

/// Holds the currently published snapshot.
///
/// The lock guards only an `Arc` swap, never fetch or decode work, so
/// readers wait at most for a pointer copy. Cloning the store shares the
/// same slot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    /// Create a store holding `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Replace the live snapshot.
    pub async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.inner.write().await;
        *guard = Arc::clone(&snapshot);
        snapshot
    }

    /// The live snapshot.
    pub async fn read(&self) -> Arc<Snapshot> {
        let guard = self.inner.read().await;
        Arc::clone(&*guard)
    }
}
