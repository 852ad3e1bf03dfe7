//! On-disk Arrow IPC snapshot of the analysis dataset.
//!
//! The snapshot lives in a run-scoped temporary directory. Readers memory-map
//! the file and decode only the columns they ask for. The directory is removed
//! when the snapshot is dropped. Runs also register the directory in
//! [`LiveSnapshots`] so a process exit that skips destructors can remove it.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use polars::prelude::{DataFrame, IpcReader, IpcWriter, SerReader, SerWriter};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{Result, RunError};

const SNAPSHOT_FILE: &str = "snapshot.arrow";

/// A read-only, memory-mappable copy of the dataset.
#[derive(Debug)]
pub struct Snapshot {
    dir: TempDir,
    path: PathBuf,
}

impl Snapshot {
    /// Write `frame` as uncompressed Arrow IPC into a fresh temp directory.
    pub fn materialize(frame: &DataFrame) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("polars-mas-")
            .tempdir()
            .map_err(|source| RunError::Snapshot {
                path: std::env::temp_dir(),
                source,
            })?;
        let path = dir.path().join(SNAPSHOT_FILE);
        let mut file = File::create(&path).map_err(|source| RunError::Snapshot {
            path: path.clone(),
            source,
        })?;
        let mut frame = frame.clone();
        IpcWriter::new(&mut file).finish(&mut frame)?;
        debug!(
            path = %path.display(),
            rows = frame.height(),
            columns = frame.width(),
            "snapshot written"
        );
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The run-scoped directory holding the snapshot file.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Decode only `columns`, memory-mapping the snapshot file.
    pub fn open_projection(&self, columns: &[String]) -> Result<DataFrame> {
        let file = File::open(&self.path).map_err(|source| RunError::Snapshot {
            path: self.path.clone(),
            source,
        })?;
        let frame = IpcReader::new(file)
            .with_columns(Some(columns.to_vec()))
            .memory_mapped(Some(self.path.clone()))
            .finish()?;
        Ok(frame)
    }

    /// Remove the snapshot now. Cleanup problems are logged, not returned.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "snapshot removed"),
            Err(error) => warn!(path = %path.display(), %error, "failed to remove snapshot"),
        }
    }
}

/// Snapshot directories that currently exist, shared across threads.
#[derive(Debug, Clone, Default)]
pub struct LiveSnapshots(Arc<Mutex<Vec<PathBuf>>>);

impl LiveSnapshots {
    fn entries(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, dir: PathBuf) {
        self.entries().push(dir);
    }

    pub fn remove(&self, dir: &Path) {
        self.entries().retain(|entry| entry != dir);
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries().clone()
    }

    /// Delete every registered directory and clear the registry.
    ///
    /// Returns the number of directories removed.
    pub fn remove_all(&self) -> usize {
        let dirs: Vec<PathBuf> = self.entries().drain(..).collect();
        let mut removed = 0;
        for dir in dirs {
            match fs::remove_dir_all(&dir) {
                Ok(()) => removed += 1,
                Err(error) => warn!(path = %dir.display(), %error, "failed to remove snapshot"),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn projection_reads_requested_columns_and_close_removes_file() {
        let frame = df! {
            "snp" => [0.0, 1.0, 2.0],
            "age" => [40.0, 50.0, 60.0],
            "y" => [0.0, 1.0, 1.0],
        }
        .unwrap();
        let snapshot = Snapshot::materialize(&frame).unwrap();
        let path = snapshot.path().to_path_buf();
        assert!(path.exists());

        let projected = snapshot
            .open_projection(&["y".to_string(), "snp".to_string()])
            .unwrap();
        assert_eq!(projected.width(), 2);
        assert_eq!(projected.height(), 3);

        snapshot.close();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_directory() {
        let frame = df! { "x" => [1.0] }.unwrap();
        let snapshot = Snapshot::materialize(&frame).unwrap();
        let dir = snapshot.path().parent().unwrap().to_path_buf();
        drop(snapshot);
        assert!(!dir.exists());
    }

    #[test]
    fn registry_removes_directories_left_behind() {
        let frame = df! { "x" => [1.0, 2.0] }.unwrap();
        let snapshot = Snapshot::materialize(&frame).unwrap();
        let live = LiveSnapshots::default();
        live.insert(snapshot.dir().to_path_buf());
        let dir = snapshot.dir().to_path_buf();
        std::mem::forget(snapshot);

        assert_eq!(live.remove_all(), 1);
        assert!(!dir.exists());
        assert!(live.paths().is_empty());
    }
}
