//! Snapshot and restore of the store file.
//!
//! A snapshot is a byte-for-byte copy of the SQLite file. The copy is taken
//! while holding the pool's only connection, so no write can interleave with
//! it. Restore swaps a snapshot in through a staging file and a rename, then
//! reconnects.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{Database, MIGRATOR, RepositoryError, create_pool};
use crate::error::ValidationError;

/// First bytes of every SQLite 3 database file.
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// How many numbered suffixes to try when a timestamped name is taken.
const MAX_NAME_ATTEMPTS: u32 = 100;

impl Database {
    /// Copy the store to `destination`, or to a timestamped file in the
    /// backups directory when `None`.
    ///
    /// Never overwrites an existing file. Returns the path written, or `None`
    /// if the copy failed (the failure is logged and any partial file is
    /// removed).
    pub async fn backup(&self, destination: Option<&Path>) -> Option<PathBuf> {
        match self.try_backup(destination).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Backup created");
                Some(path)
            }
            Err(e) => {
                tracing::error!(error = %e, "Backup failed");
                None
            }
        }
    }

    /// Replace the store with the snapshot at `snapshot`.
    ///
    /// Destructive: everything written since the snapshot is lost. Callers
    /// must confirm with the operator first. Returns `false` if the snapshot
    /// is unreadable or not an SQLite file; in that case the live store is
    /// left as it was.
    pub async fn restore(&mut self, snapshot: &Path) -> bool {
        match self.try_restore(snapshot).await {
            Ok(()) => {
                tracing::info!(snapshot = %snapshot.display(), "Store restored from snapshot");
                true
            }
            Err(e) => {
                tracing::error!(snapshot = %snapshot.display(), error = %e, "Restore failed");
                false
            }
        }
    }

    async fn try_backup(&self, destination: Option<&Path>) -> Result<PathBuf, RepositoryError> {
        // Holding the only connection keeps every other operation out until
        // the copy is complete.
        let _conn = self.pool.acquire().await?;

        let (path, mut target) = match destination {
            Some(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    fs::create_dir_all(parent).await?;
                }
                (path.to_path_buf(), create_new(path).await?)
            }
            None => self.reserve_timestamped().await?,
        };

        if let Err(e) = copy_into(&self.path, &mut target).await {
            drop(target);
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Could not remove partial backup"
                );
            }
            return Err(e.into());
        }

        Ok(path)
    }

    /// Create a new, uniquely named snapshot file in the backups directory.
    async fn reserve_timestamped(&self) -> Result<(PathBuf, File), RepositoryError> {
        fs::create_dir_all(&self.backups_dir).await?;

        let stem = format!("law_office_backup_{}", Local::now().format("%Y%m%d_%H%M%S"));

        let mut attempt = 0;
        loop {
            let name = if attempt == 0 {
                format!("{stem}.db")
            } else {
                format!("{stem}_{attempt}.db")
            };
            let path = self.backups_dir.join(name);

            match create_new(&path).await {
                Ok(file) => return Ok((path, file)),
                Err(e)
                    if e.kind() == std::io::ErrorKind::AlreadyExists
                        && attempt < MAX_NAME_ATTEMPTS =>
                {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn try_restore(&mut self, snapshot: &Path) -> Result<(), RepositoryError> {
        ensure_sqlite_file(snapshot).await?;

        let staging = staging_path(&self.path);
        fs::copy(snapshot, &staging).await?;

        self.pool.close().await;

        let swapped = fs::rename(&staging, &self.path).await;
        if swapped.is_err() {
            fs::remove_file(&staging).await.ok();
        } else {
            // A leftover rollback journal belongs to the replaced file.
            fs::remove_file(journal_path(&self.path)).await.ok();
        }

        // Reconnect even when the swap failed so the handle stays usable.
        self.pool = create_pool(&self.path).await?;
        swapped?;

        // Bring an older snapshot up to the current schema.
        MIGRATOR.run(&self.pool).await?;

        Ok(())
    }
}

async fn create_new(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path).await
}

async fn copy_into(source: &Path, target: &mut File) -> std::io::Result<()> {
    let mut source = File::open(source).await?;
    tokio::io::copy(&mut source, target).await?;
    target.flush().await?;
    target.sync_all().await
}

async fn ensure_sqlite_file(path: &Path) -> Result<(), RepositoryError> {
    let mut header = [0u8; 16];
    let mut file = File::open(path).await?;

    let matches = file.read_exact(&mut header).await.is_ok() && &header == SQLITE_HEADER;
    if !matches {
        return Err(ValidationError::new("snapshot", "is not an SQLite database").into());
    }
    Ok(())
}

fn staging_path(live: &Path) -> PathBuf {
    let mut name = live.as_os_str().to_owned();
    name.push(".restore");
    PathBuf::from(name)
}

fn journal_path(live: &Path) -> PathBuf {
    let mut name = live.as_os_str().to_owned();
    name.push("-journal");
    PathBuf::from(name)
}
