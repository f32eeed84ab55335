//! # Snapshots
//!
//! Browsers keep their history database open while running, so a source is
//! never queried in place. It is copied (with its `-wal` sidecar, when one
//! exists) into a uniquely named temporary directory, and the directory is
//! removed when the [`Snapshot`] is dropped, whichever way the caller exits.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::util::file_safe;

const SNAPSHOT_FILE: &str = "snapshot.sqlite";

#[derive(Debug)]
pub struct Snapshot {
    dir: Option<TempDir>,
    db_path: PathBuf,
}

impl Snapshot {
    /// Copy `source` into a fresh directory under `temp_root`.
    pub fn capture(source: &Path, family: &str, temp_root: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("histcarve_{}_", file_safe(family)))
            .tempdir_in(temp_root)?;
        let db_path = dir.path().join(SNAPSHOT_FILE);
        let snapshot = Self {
            dir: Some(dir),
            db_path,
        };

        std::fs::copy(source, &snapshot.db_path)?;

        let wal = sidecar(source, "-wal");
        if wal.is_file() {
            if let Err(err) = std::fs::copy(&wal, sidecar(&snapshot.db_path, "-wal")) {
                warn!(
                    "could not copy {} ({err}); snapshot may miss recent rows",
                    wal.display()
                );
            }
        }

        debug!("snapshot {} -> {}", source.display(), snapshot.db_path.display());
        Ok(snapshot)
    }

    /// Database file inside the snapshot directory.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                warn!("failed to remove snapshot {}: {err}", path.display());
            }
        }
    }
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
