//! Task progress reporting.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

/// Tasks between progress lines for a run of `total` tasks.
pub fn progress_interval(total: usize) -> usize {
    match total {
        0..10 => 1,
        10..50 => 5,
        50..100 => 10,
        100..200 => 20,
        200..300 => 30,
        300..400 => 40,
        400..1000 => 50,
        _ => 100,
    }
}

/// Counts finished tasks across workers and logs at fixed intervals.
#[derive(Debug)]
pub(crate) struct Progress {
    total: usize,
    interval: usize,
    done: AtomicUsize,
}

impl Progress {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            interval: progress_interval(total),
            done: AtomicUsize::new(0),
        }
    }

    pub(crate) fn task_finished(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.interval == 0 || done == self.total {
            info!(
                completed = done,
                total = self.total,
                "progress: {done}/{} ({}%)",
                self.total,
                100 * done / self.total.max(1)
            );
        }
    }

    pub(crate) fn finished(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}
