//! Store creation and schema migration.
//!
//! Opening the store applies every pending migration. A store with no
//! accounts also gets the bootstrap administrator.

use super::{CliError, open};

/// Create or upgrade the configured store.
pub async fn run() -> Result<(), CliError> {
    tracing::info!("Opening office store...");
    let (config, db) = open().await?;

    tracing::info!(
        database = %db.path().display(),
        backups = %config.backups_dir.display(),
        "Store is up to date"
    );
    db.close().await;
    Ok(())
}
