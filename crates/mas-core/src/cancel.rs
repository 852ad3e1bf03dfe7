use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::snapshot::LiveSnapshots;

/// Shared flag telling workers to stop picking up new tasks.
///
/// It also carries the registry of snapshot directories the run has open, so
/// an interrupt handler that exits the process can still remove them.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
    snapshots: LiveSnapshots,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn live_snapshots(&self) -> &LiveSnapshots {
        &self.snapshots
    }
}
