use crate::models::ActiveTest;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-wide registry of in-flight test runs.
///
/// Shared between the HTTP handlers and the background workers; presence
/// of a test id is the sole liveness signal a sequencer consults. The
/// map is mutated by the start endpoint (insert, before the worker is
/// spawned), the cancel endpoint (remove) and the sequencer itself on
/// normal completion (remove).
#[derive(Clone, Default)]
pub struct TestRegistry {
    inner: Arc<RwLock<HashMap<String, ActiveTest>>>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, test_id: String, entry: ActiveTest) {
        self.inner.write().await.insert(test_id, entry);
    }

    /// Remove an entry; returns whether it was present. Removal is what
    /// cancels a running sequence.
    pub async fn remove(&self, test_id: &str) -> bool {
        self.inner.write().await.remove(test_id).is_some()
    }

    pub async fn contains(&self, test_id: &str) -> bool {
        self.inner.read().await.contains_key(test_id)
    }

    /// Point-in-time copy of the registry for the listing endpoint.
    pub async fn snapshot(&self) -> HashMap<String, ActiveTest> {
        self.inner.read().await.clone()
    }
}
