use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide flags shared by every sync pass.
#[derive(Debug, Default)]
pub struct SyncState {
    in_progress: AtomicBool,
    media_refresh_owed: AtomicBool,
}

impl SyncState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claims the single pass slot, or `None` if a pass is already running.
    pub fn try_begin(self: &Arc<Self>) -> Option<PassGuard> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard {
                state: Arc::clone(self),
            })
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub fn media_refresh_owed(&self) -> bool {
        self.media_refresh_owed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_refresh_owed(&self) {
        self.media_refresh_owed.store(true, Ordering::Release);
    }

    pub(crate) fn reset_refresh_owed(&self) {
        self.media_refresh_owed.store(false, Ordering::Release);
    }
}

/// Held for the duration of one pass; releases the slot when dropped.
#[derive(Debug)]
pub struct PassGuard {
    state: Arc<SyncState>,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.state.in_progress.store(false, Ordering::Release);
    }
}
