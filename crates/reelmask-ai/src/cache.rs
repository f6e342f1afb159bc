//! Per-frame result cache.

use crate::detection::FrameResult;
use parking_lot::Mutex;
use reelmask_core::FrameIndex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<FrameResult>>>;

/// Results keyed by sampling-grid frame index.
///
/// Each key is computed at most once: a caller arriving while another is
/// computing the same frame waits for that result instead of recomputing.
#[derive(Default)]
pub struct FrameCache {
    slots: Mutex<HashMap<FrameIndex, Slot>>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `index`, running `compute` if absent.
    ///
    /// If the computing caller is dropped before finishing, the next caller
    /// computes instead.
    pub async fn get_or_compute<F, Fut>(&self, index: FrameIndex, compute: F) -> Arc<FrameResult>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FrameResult>,
    {
        let slot = self.slots.lock().entry(index).or_default().clone();
        slot.get_or_init(move || async move { Arc::new(compute().await) })
            .await
            .clone()
    }

    /// Completed result for `index`, if any.
    pub fn get(&self, index: FrameIndex) -> Option<Arc<FrameResult>> {
        self.slots
            .lock()
            .get(&index)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of completed results.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. In-flight computations finish into detached slots.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}
