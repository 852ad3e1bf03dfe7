//! Ctrl-C handling.
//!
//! The analysis runs on plain threads, so the signal is awaited on a small
//! current-thread tokio runtime of its own.

use std::io;
use std::thread;

use mas_core::CancellationFlag;
use tracing::{debug, warn};

use crate::commands::EXIT_INTERRUPTED;

/// Spawn a background thread that sets `cancel` on the first Ctrl-C.
///
/// A second Ctrl-C removes any live snapshot directories and exits
/// immediately with `EXIT_INTERRUPTED`.
pub fn spawn_interrupt_watcher(cancel: CancellationFlag) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("mas-signal".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    debug!(%error, "interrupt handler unavailable");
                    return;
                }
                warn!("interrupt received, stopping after in-flight tasks");
                cancel.cancel();
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("\nReceived second interrupt, aborting immediately.");
                    remove_live_snapshots(&cancel);
                    std::process::exit(EXIT_INTERRUPTED);
                }
            });
        })?;
    Ok(())
}

/// Delete the snapshot directories of the current run. `process::exit` skips
/// destructors, so this runs first on the abort path.
pub fn remove_live_snapshots(cancel: &CancellationFlag) -> usize {
    let removed = cancel.live_snapshots().remove_all();
    if removed > 0 {
        debug!(removed, "removed snapshot directories before exit");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use mas_core::Snapshot;
    use polars::prelude::*;

    #[test]
    fn abort_path_removes_open_snapshot() {
        let frame = df! { "snp" => [0.0, 1.0, 2.0] }.unwrap();
        let snapshot = Snapshot::materialize(&frame).unwrap();
        let dir = snapshot.dir().to_path_buf();
        let cancel = CancellationFlag::new();
        cancel.live_snapshots().insert(dir.clone());
        std::mem::forget(snapshot);

        assert_eq!(remove_live_snapshots(&cancel), 1);
        assert!(!dir.exists());
        assert_eq!(remove_live_snapshots(&cancel), 0);
    }
}
