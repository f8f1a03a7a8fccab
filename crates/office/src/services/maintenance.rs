//! Administrator-only store maintenance: snapshots and restores.

use std::path::{Path, PathBuf};

use super::auth::Session;
use crate::db::Database;
use crate::error::OfficeError;

/// Take a snapshot of the store.
///
/// With no `destination` the snapshot goes into the backups directory under
/// a timestamped name. Returns `None` if the copy failed; details are logged.
///
/// # Errors
///
/// `Unauthenticated` / `Forbidden` unless an administrator is logged in.
pub async fn backup(
    session: &Session,
    db: &Database,
    destination: Option<&Path>,
) -> Result<Option<PathBuf>, OfficeError> {
    let gate = session.gate();
    let actor = gate.require(gate.is_admin(), "back up the store")?;
    tracing::info!(user_id = %actor.id, "Backup requested");

    Ok(db.backup(destination).await)
}

/// Replace the live store with `snapshot`.
///
/// Destructive: everything written since the snapshot is lost. The caller
/// confirms with the operator beforehand. Returns `false` if the snapshot
/// could not be applied, in which case the live store is unchanged.
///
/// # Errors
///
/// `Unauthenticated` / `Forbidden` unless an administrator is logged in.
pub async fn restore(
    session: &Session,
    db: &mut Database,
    snapshot: &Path,
) -> Result<bool, OfficeError> {
    let gate = session.gate();
    let actor = gate.require(gate.is_admin(), "restore the store")?;
    tracing::warn!(
        user_id = %actor.id,
        snapshot = %snapshot.display(),
        "Restore requested"
    );

    Ok(db.restore(snapshot).await)
}
