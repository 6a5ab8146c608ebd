//! # Cluster Repository
//!
//! Registry of managed clusters. Deleting a cluster cascades to its
//! configuration assignments and triggers.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityName, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::info;

use super::require_name;
use crate::error::RepositoryError;
use crate::models::cluster::{self, ActiveModel as ClusterActiveModel, Entity as Cluster};
use crate::storage::{SelectQuery, Storage};

/// Lookup by id, by name, or both. Unset fields are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct ClusterLookup {
    pub id: Option<i32>,
    pub name: Option<String>,
}

impl ClusterLookup {
    pub fn by_id(id: i32) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

/// Repository for cluster rows
pub struct ClusterRepository<'a> {
    storage: &'a Storage,
}

impl<'a> ClusterRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All clusters ordered by id
    pub async fn list(&self) -> Result<Vec<cluster::Model>, RepositoryError> {
        let db = self.storage.connection()?;
        SelectQuery::<Cluster>::new()
            .all(db, self.storage.dialect())
            .await
    }

    /// Clusters matching every set field of `lookup`
    pub async fn find(&self, lookup: &ClusterLookup) -> Result<Vec<cluster::Model>, RepositoryError> {
        let db = self.storage.connection()?;
        SelectQuery::<Cluster>::new()
            .equals(cluster::Column::Id, lookup.id)
            .equals(cluster::Column::Name, lookup.name.clone())
            .all(db, self.storage.dialect())
            .await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<cluster::Model, RepositoryError> {
        self.find(&ClusterLookup::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::not_found(format!("cluster {id}")))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<cluster::Model, RepositoryError> {
        self.find(&ClusterLookup::by_name(name))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::not_found(format!("cluster '{name}'")))
    }

    /// Registers a cluster and returns its generated id.
    pub async fn create(&self, name: &str) -> Result<i32, RepositoryError> {
        require_name("cluster name", name)?;
        let db = self.storage.connection()?;

        let row = ClusterActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };
        let id = Cluster::insert(row).exec(db).await?.last_insert_id;

        info!(cluster_id = id, cluster = name, "cluster registered");
        Ok(id)
    }

    /// Registers a cluster under a caller-chosen id. Later [`create`](Self::create)
    /// calls continue after the highest id in the table.
    pub async fn create_with_id(&self, id: i32, name: &str) -> Result<i32, RepositoryError> {
        require_name("cluster name", name)?;
        let db = self.storage.connection()?;

        let row = ClusterActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
        };
        let txn = db.begin().await?;
        Cluster::insert(row).exec(&txn).await?;
        if let Some(resync) = self.storage.dialect().serial_resync(Cluster.table_name()) {
            txn.execute(resync).await?;
        }
        txn.commit().await?;

        info!(cluster_id = id, cluster = name, "cluster registered");
        Ok(id)
    }

    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let db = self.storage.connection()?;
        let result = Cluster::delete_many()
            .filter(cluster::Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!("cluster {id}")));
        }
        info!(cluster_id = id, "cluster deleted");
        Ok(())
    }

    pub async fn delete_by_name(&self, name: &str) -> Result<(), RepositoryError> {
        let db = self.storage.connection()?;
        let result = Cluster::delete_many()
            .filter(cluster::Column::Name.eq(name))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!("cluster '{name}'")));
        }
        info!(cluster = name, "cluster deleted");
        Ok(())
    }
}
