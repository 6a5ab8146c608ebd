//! # Storage
//!
//! [`Storage`] owns the connection pool and the [`Dialect`] chosen at open
//! time. Repositories borrow it, so every operation runs against the same
//! pool and renders SQL for the same engine.

mod dialect;
pub mod query;

use std::time::Duration;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, RuntimeErr, Statement,
};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::RepositoryError;
use crate::repositories::{
    ClusterConfigurationRepository, ClusterRepository, ConfigurationProfileRepository,
    TriggerRepository, TriggerTypeRepository,
};

pub use dialect::Dialect;
pub use query::SelectQuery;

const CONNECT_ATTEMPTS: u32 = 5;

/// Errors raised while opening storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageOpenError {
    #[error("Invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
    #[error("Failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: DbErr,
    },
}

/// Connection pool plus dialect, the entry point to every repository.
pub struct Storage {
    db: DatabaseConnection,
    dialect: Dialect,
}

impl Storage {
    /// Wraps an already opened connection.
    pub fn new(db: DatabaseConnection, dialect: Dialect) -> Self {
        Self { db, dialect }
    }

    /// Opens the pool described by `cfg`, retrying with exponential backoff,
    /// and applies migrations when `auto_migrate` is set.
    pub async fn connect(cfg: &AppConfig) -> Result<Self> {
        if cfg.database_url.trim().is_empty() {
            return Err(StorageOpenError::InvalidConfiguration {
                message: "database URL cannot be empty".to_string(),
            }
            .into());
        }

        let dialect = cfg.dialect().map_err(|e| StorageOpenError::InvalidConfiguration {
            message: e.to_string(),
        })?;

        // Every connection to `:memory:` would open a distinct database.
        let max_connections = if cfg.database_url.contains(":memory:") {
            1
        } else {
            cfg.db_max_connections
        };

        let mut opt = ConnectOptions::new(&cfg.database_url);
        opt.max_connections(max_connections)
            .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let mut retry_delay = Duration::from_millis(100);
        let mut attempt = 1;
        let db = loop {
            match Database::connect(opt.clone()).await {
                Ok(conn) => {
                    info!(attempt, ?dialect, "connected to database");
                    break conn;
                }
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    warn!(attempt, error = %e, ?retry_delay, "database connection failed, retrying");
                    sleep(retry_delay).await;
                    retry_delay *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(StorageOpenError::ConnectionFailed { source: e })
                        .with_context(|| format!("gave up after {CONNECT_ATTEMPTS} attempts"));
                }
            }
        };

        let storage = Self::new(db, dialect);
        if cfg.auto_migrate {
            storage.init().await.context("failed to apply migrations")?;
        }
        Ok(storage)
    }

    /// Creates missing tables and indexes. Safe to call repeatedly.
    pub async fn init(&self) -> Result<(), RepositoryError> {
        let db = self.connection()?;
        Migrator::up(db, None).await?;
        debug!("schema is up to date");
        Ok(())
    }

    /// Runs `SELECT 1` against the pool.
    pub async fn health_check(&self) -> Result<(), RepositoryError> {
        let db = self.connection()?;
        db.query_one(Statement::from_string(
            self.dialect.backend(),
            "SELECT 1".to_string(),
        ))
        .await?;
        Ok(())
    }

    /// Closes the pool. Later operations fail with a storage error.
    pub async fn close(&mut self) -> Result<(), RepositoryError> {
        let db = std::mem::take(&mut self.db);
        if matches!(db, DatabaseConnection::Disconnected) {
            return Ok(());
        }
        db.close().await?;
        info!("database connection closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.db, DatabaseConnection::Disconnected)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Live connection, or a storage error once [`close`](Self::close) ran.
    pub fn connection(&self) -> Result<&DatabaseConnection, RepositoryError> {
        if self.is_closed() {
            return Err(RepositoryError::Storage(DbErr::Conn(RuntimeErr::Internal(
                "database connection is closed".to_string(),
            ))));
        }
        Ok(&self.db)
    }

    pub fn clusters(&self) -> ClusterRepository<'_> {
        ClusterRepository::new(self)
    }

    pub fn profiles(&self) -> ConfigurationProfileRepository<'_> {
        ConfigurationProfileRepository::new(self)
    }

    pub fn configurations(&self) -> ClusterConfigurationRepository<'_> {
        ClusterConfigurationRepository::new(self)
    }

    pub fn trigger_types(&self) -> TriggerTypeRepository<'_> {
        TriggerTypeRepository::new(self)
    }

    pub fn triggers(&self) -> TriggerRepository<'_> {
        TriggerRepository::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_database_url_is_rejected() {
        let config = AppConfig {
            database_url: String::new(),
            ..Default::default()
        };

        let result = Storage::connect(&config).await;
        let err = result.err().expect("connect should fail");
        assert!(matches!(
            err.downcast::<StorageOpenError>(),
            Ok(StorageOpenError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_memory_database_is_migrated_on_connect() {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            ..Default::default()
        };

        let storage = Storage::connect(&config).await.unwrap();
        assert_eq!(storage.dialect(), Dialect::Sqlite);
        storage.health_check().await.unwrap();
        assert!(storage.clusters().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_operations_after_close_fail_with_storage_error() {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        let mut storage = Storage::connect(&config).await.unwrap();

        storage.close().await.unwrap();
        assert!(storage.is_closed());

        let err = storage.clusters().list().await.unwrap_err();
        assert!(err.is_storage());
        let err = storage.health_check().await.unwrap_err();
        assert!(err.is_storage());

        // closing twice is harmless
        storage.close().await.unwrap();
    }
}
