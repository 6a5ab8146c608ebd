//! Test utilities for storage-backed tests.
//!
//! Opens an in-memory SQLite database with all migrations applied and
//! seeds common fixtures.

use anyhow::Result;
use controller::storage::{Dialect, Storage};
use sea_orm::{ConnectOptions, Database};

/// In-memory SQLite storage with the schema applied.
///
/// One pooled connection: every connection to `:memory:` is a separate database.
pub async fn setup_storage() -> Result<Storage> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await?;
    let storage = Storage::new(db, Dialect::Sqlite);
    storage.init().await?;
    Ok(storage)
}

/// Registers `cluster0`..`cluster{count-1}` with ids 0..count.
#[allow(dead_code)]
pub async fn seed_clusters(storage: &Storage, count: i32) -> Result<()> {
    for id in 0..count {
        storage
            .clusters()
            .create_with_id(id, &format!("cluster{id}"))
            .await?;
    }
    Ok(())
}

/// Number of active configuration rows for `cluster`.
#[allow(dead_code)]
pub async fn active_count(storage: &Storage, cluster: &str) -> Result<usize> {
    let rows = storage.configurations().list_for_cluster(cluster).await?;
    Ok(rows.iter().filter(|row| row.active).count())
}
