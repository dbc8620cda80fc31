use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fetch_core::WorkerState;

/// Single-writer cell holding the latest published [`WorkerState`].
///
/// Writers build the next state on a private copy and swap it in whole, so a
/// reader holding an `Arc` from [`SnapshotCell::load`] can never see half of an
/// update. The lock is held only for the pointer swap or clone.
pub(crate) struct SnapshotCell {
    current: Mutex<Arc<WorkerState>>,
}

impl SnapshotCell {
    pub(crate) fn new(initial: WorkerState) -> Self {
        Self {
            current: Mutex::new(Arc::new(initial)),
        }
    }

    pub(crate) fn load(&self) -> Arc<WorkerState> {
        Arc::clone(&self.lock())
    }

    pub(crate) fn publish<R>(&self, apply: impl FnOnce(&mut WorkerState) -> R) -> R {
        let mut guard = self.lock();
        let mut next = WorkerState::clone(&guard);
        let result = apply(&mut next);
        *guard = Arc::new(next);
        result
    }

    fn lock(&self) -> MutexGuard<'_, Arc<WorkerState>> {
        // A panic while holding the lock cannot leave a torn value behind:
        // the swap is the last statement under the guard.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fetch_core::WorkerState;

    use super::SnapshotCell;

    #[test]
    fn loaded_snapshot_is_unaffected_by_later_publish() {
        let cell = SnapshotCell::new(WorkerState::initial("first"));
        let before = cell.load();

        cell.publish(|state| state.advance(1, "second"));

        assert_eq!(before.message, "first");
        assert_eq!(cell.load().message, "second");
        assert!(!Arc::ptr_eq(&before, &cell.load()));
    }
}
