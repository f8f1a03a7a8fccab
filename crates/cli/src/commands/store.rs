//! Backup and restore commands.

use std::path::Path;

use law_office::services::maintenance;

use super::{CliError, login};

/// Write a snapshot and report where it went.
pub async fn backup(actor: Option<&str>, path: Option<&Path>) -> Result<(), CliError> {
    let (db, session) = login(actor).await?;

    let written = maintenance::backup(&session, &db, path)
        .await?
        .ok_or(CliError::BackupFailed)?;

    tracing::info!(snapshot = %written.display(), "Backup written");
    db.close().await;
    Ok(())
}

/// Replace the store with `file`. Refuses to run unless `confirmed`.
pub async fn restore(actor: Option<&str>, file: &Path, confirmed: bool) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::RestoreNotConfirmed);
    }

    let (mut db, session) = login(actor).await?;

    if !maintenance::restore(&session, &mut db, file).await? {
        return Err(CliError::RestoreFailed);
    }

    tracing::info!(snapshot = %file.display(), "Store restored");
    db.close().await;
    Ok(())
}
