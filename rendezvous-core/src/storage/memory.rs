//! In-memory row store

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::RowStore;
use crate::data::Row;
use crate::error::{RendezvousError, Result};

const MEMORY_PATH: &str = "memory";

/// Row store holding rows in memory, with load/save counters
///
/// Clones share the same rows and counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Mutex<Vec<Row>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    /// Create a store seeded with `rows`
    pub fn new(rows: Vec<Row>) -> Self {
        let store = Self::default();
        *store.inner.rows.lock() = rows;
        store
    }

    /// Current contents
    pub fn rows(&self) -> Vec<Row> {
        self.inner.rows.lock().clone()
    }

    /// Number of `load` calls so far
    pub fn load_count(&self) -> usize {
        self.inner.loads.load(Ordering::Relaxed)
    }

    /// Number of `save` calls so far
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::Relaxed)
    }

    /// Make subsequent loads fail with `SourceUnavailable`
    pub fn fail_loads(&self, fail: bool) {
        self.inner.fail_loads.store(fail, Ordering::Relaxed);
    }

    /// Make subsequent saves fail with `SinkUnavailable`
    pub fn fail_saves(&self, fail: bool) {
        self.inner.fail_saves.store(fail, Ordering::Relaxed);
    }
}

impl RowStore for MemoryStore {
    fn load(&self) -> Result<Vec<Row>> {
        self.inner.loads.fetch_add(1, Ordering::Relaxed);
        if self.inner.fail_loads.load(Ordering::Relaxed) {
            return Err(RendezvousError::SourceUnavailable {
                path: MEMORY_PATH.into(),
                reason: "loads disabled".into(),
            });
        }
        Ok(self.rows())
    }

    fn save(&self, rows: &[Row]) -> Result<()> {
        self.inner.saves.fetch_add(1, Ordering::Relaxed);
        if self.inner.fail_saves.load(Ordering::Relaxed) {
            return Err(RendezvousError::SinkUnavailable {
                path: MEMORY_PATH.into(),
                reason: "saves disabled".into(),
            });
        }
        *self.inner.rows.lock() = rows.to_vec();
        Ok(())
    }
}
