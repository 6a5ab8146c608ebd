//! # Cluster Configuration Repository
//!
//! Assigns configuration profiles to clusters and controls which assignment
//! is active. Cluster-scoped mutations (`create`, `assign`, `enable`,
//! `disable`) run in one transaction that first locks the cluster row, so at
//! most one assignment per cluster is active once they commit.
//!
//! [`enable_or_disable_by_id`](ClusterConfigurationRepository::enable_or_disable_by_id)
//! flips a single row and does not touch the cluster's other assignments.

use std::collections::HashMap;

use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument};

use super::{cluster_id_by_name, now, require_name};
use crate::error::RepositoryError;
use crate::models::cluster_configuration::{
    self, ActiveModel as AssignmentActiveModel, ClusterConfiguration, Column,
    Entity as Assignment,
};
use crate::models::configuration_profile::{
    self, ActiveModel as ProfileActiveModel, Entity as ConfigurationProfile,
};
use crate::storage::{Dialect, SelectQuery, Storage};

/// Who changed an assignment and why.
struct Change<'s> {
    user: &'s str,
    reason: &'s str,
    at: sea_orm::prelude::DateTimeWithTimeZone,
}

pub struct ClusterConfigurationRepository<'a> {
    storage: &'a Storage,
}

impl<'a> ClusterConfigurationRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Every assignment of every cluster
    pub async fn list(&self) -> Result<Vec<ClusterConfiguration>, RepositoryError> {
        let db = self.storage.connection()?;
        let rows = SelectQuery::<Assignment>::new()
            .all(db, self.storage.dialect())
            .await?;
        with_profiles(db, self.storage.dialect(), rows).await
    }

    /// Assignments of one cluster, oldest first
    pub async fn list_for_cluster(
        &self,
        cluster: &str,
    ) -> Result<Vec<ClusterConfiguration>, RepositoryError> {
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();
        let cluster_id = cluster_id_by_name(db, dialect, cluster, false).await?;

        let rows = SelectQuery::<Assignment>::new()
            .equals(Column::Cluster, Some(cluster_id))
            .all(db, dialect)
            .await?;
        with_profiles(db, dialect, rows).await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<ClusterConfiguration, RepositoryError> {
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();

        let row = SelectQuery::<Assignment>::new()
            .equals(Column::Id, Some(id))
            .one(db, dialect)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("cluster configuration {id}")))?;

        with_profiles(db, dialect, vec![row])
            .await?
            .pop()
            .ok_or_else(|| RepositoryError::not_found(format!("cluster configuration {id}")))
    }

    /// Stores `configuration` as a new profile and makes it the cluster's
    /// only active assignment. Returns the cluster's assignments.
    #[instrument(skip(self, configuration), fields(bytes = configuration.len()))]
    pub async fn create(
        &self,
        cluster: &str,
        user: &str,
        reason: &str,
        description: &str,
        configuration: &str,
    ) -> Result<Vec<ClusterConfiguration>, RepositoryError> {
        require_name("user", user)?;
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();
        let change = Change {
            user,
            reason,
            at: now(),
        };

        let txn = db.begin().await?;
        let cluster_id = cluster_id_by_name(&txn, dialect, cluster, true).await?;

        let profile = ProfileActiveModel {
            configuration: Set(configuration.to_string()),
            changed_at: Set(change.at),
            changed_by: Set(user.to_string()),
            description: Set(description.to_string()),
            ..Default::default()
        };
        let profile_id = ConfigurationProfile::insert(profile)
            .exec(&txn)
            .await?
            .last_insert_id;

        let deactivated = deactivate_others(&txn, cluster_id, None, &change).await?;
        let assignment_id = insert_assignment(&txn, cluster_id, profile_id, true, &change).await?;
        txn.commit().await?;

        info!(
            cluster_id,
            profile_id, assignment_id, deactivated, "configuration created and activated"
        );
        self.list_for_cluster(cluster).await
    }

    /// Attaches an existing profile to the cluster. An active assignment
    /// replaces whichever one was active before.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        cluster: &str,
        profile_id: i32,
        user: &str,
        reason: &str,
        active: bool,
    ) -> Result<Vec<ClusterConfiguration>, RepositoryError> {
        require_name("user", user)?;
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();
        let change = Change {
            user,
            reason,
            at: now(),
        };

        let txn = db.begin().await?;
        let cluster_id = cluster_id_by_name(&txn, dialect, cluster, true).await?;

        SelectQuery::<ConfigurationProfile>::new()
            .equals(configuration_profile::Column::Id, Some(profile_id))
            .one(&txn, dialect)
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found(format!("configuration profile {profile_id}"))
            })?;

        if active {
            deactivate_others(&txn, cluster_id, None, &change).await?;
        }
        let assignment_id =
            insert_assignment(&txn, cluster_id, profile_id, active, &change).await?;
        txn.commit().await?;

        info!(cluster_id, profile_id, assignment_id, active, "profile assigned");
        self.list_for_cluster(cluster).await
    }

    /// Activates the cluster's most recent assignment and deactivates all
    /// others. Calling it again is a no-op apart from the audit fields.
    #[instrument(skip(self))]
    pub async fn enable(
        &self,
        cluster: &str,
        user: &str,
        reason: &str,
    ) -> Result<ClusterConfiguration, RepositoryError> {
        require_name("user", user)?;
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();
        let change = Change {
            user,
            reason,
            at: now(),
        };

        let txn = db.begin().await?;
        let cluster_id = cluster_id_by_name(&txn, dialect, cluster, true).await?;

        let latest = SelectQuery::<Assignment>::new()
            .equals(Column::Cluster, Some(cluster_id))
            .order_by(Column::Id, Order::Desc)
            .one(&txn, dialect)
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found(format!("configuration for cluster '{cluster}'"))
            })?;

        let deactivated = deactivate_others(&txn, cluster_id, Some(latest.id), &change).await?;
        set_active(&txn, latest.id, true, Some(&change)).await?;
        txn.commit().await?;

        info!(
            cluster_id,
            assignment_id = latest.id,
            deactivated,
            "configuration enabled"
        );
        self.get_by_id(latest.id).await
    }

    /// Deactivates every active assignment of the cluster. Idempotent.
    #[instrument(skip(self))]
    pub async fn disable(
        &self,
        cluster: &str,
        user: &str,
        reason: &str,
    ) -> Result<(), RepositoryError> {
        require_name("user", user)?;
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();
        let change = Change {
            user,
            reason,
            at: now(),
        };

        let txn = db.begin().await?;
        let cluster_id = cluster_id_by_name(&txn, dialect, cluster, true).await?;
        let deactivated = deactivate_others(&txn, cluster_id, None, &change).await?;
        txn.commit().await?;

        info!(cluster_id, deactivated, "configuration disabled");
        Ok(())
    }

    /// Sets the `active` flag of one assignment.
    ///
    /// Unlike [`enable`](Self::enable) this leaves other assignments of the
    /// same cluster alone, so enabling here can leave two active rows.
    pub async fn enable_or_disable_by_id(
        &self,
        id: i32,
        active: bool,
    ) -> Result<(), RepositoryError> {
        let db = self.storage.connection()?;
        let updated = set_active(db, id, active, None).await?;
        if updated == 0 {
            return Err(RepositoryError::not_found(format!(
                "cluster configuration {id}"
            )));
        }
        debug!(assignment_id = id, active, "assignment flag changed");
        Ok(())
    }

    /// Text of the cluster's active configuration
    pub async fn get_active_configuration(&self, cluster: &str) -> Result<String, RepositoryError> {
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();
        let cluster_id = cluster_id_by_name(db, dialect, cluster, false).await?;

        let active = SelectQuery::<Assignment>::new()
            .equals(Column::Cluster, Some(cluster_id))
            .equals(Column::Active, Some(true))
            .one(db, dialect)
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found(format!("active configuration for cluster '{cluster}'"))
            })?;

        let profile = SelectQuery::<ConfigurationProfile>::new()
            .equals(configuration_profile::Column::Id, Some(active.configuration))
            .one(db, dialect)
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found(format!(
                    "configuration profile {}",
                    active.configuration
                ))
            })?;

        Ok(profile.configuration)
    }

    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let db = self.storage.connection()?;
        let result = Assignment::delete_many()
            .filter(Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!(
                "cluster configuration {id}"
            )));
        }
        Ok(())
    }
}

/// Clears `active` on the cluster's active rows except `keep`, stamping the change.
async fn deactivate_others(
    txn: &DatabaseTransaction,
    cluster_id: i32,
    keep: Option<i32>,
    change: &Change<'_>,
) -> Result<u64, RepositoryError> {
    let mut update = Assignment::update_many()
        .col_expr(Column::Active, Expr::value(false))
        .col_expr(Column::ChangedAt, Expr::value(change.at))
        .col_expr(Column::ChangedBy, Expr::value(change.user))
        .col_expr(Column::Reason, Expr::value(change.reason))
        .filter(Column::Cluster.eq(cluster_id))
        .filter(Column::Active.eq(true));
    if let Some(keep) = keep {
        update = update.filter(Column::Id.ne(keep));
    }

    Ok(update.exec(txn).await?.rows_affected)
}

async fn set_active<C: ConnectionTrait>(
    db: &C,
    id: i32,
    active: bool,
    change: Option<&Change<'_>>,
) -> Result<u64, RepositoryError> {
    let mut update = Assignment::update_many().col_expr(Column::Active, Expr::value(active));
    if let Some(change) = change {
        update = update
            .col_expr(Column::ChangedAt, Expr::value(change.at))
            .col_expr(Column::ChangedBy, Expr::value(change.user))
            .col_expr(Column::Reason, Expr::value(change.reason));
    }

    Ok(update
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?
        .rows_affected)
}

async fn insert_assignment(
    txn: &DatabaseTransaction,
    cluster_id: i32,
    profile_id: i32,
    active: bool,
    change: &Change<'_>,
) -> Result<i32, RepositoryError> {
    let row = AssignmentActiveModel {
        cluster: Set(cluster_id),
        configuration: Set(profile_id),
        changed_at: Set(change.at),
        changed_by: Set(change.user.to_string()),
        active: Set(active),
        reason: Set(change.reason.to_string()),
        ..Default::default()
    };
    Ok(Assignment::insert(row).exec(txn).await?.last_insert_id)
}

/// Pairs assignment rows with the text of the profile each one references.
async fn with_profiles<C: ConnectionTrait>(
    db: &C,
    dialect: Dialect,
    rows: Vec<cluster_configuration::Model>,
) -> Result<Vec<ClusterConfiguration>, RepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids: Vec<i32> = rows.iter().map(|row| row.configuration).collect();
    ids.sort_unstable();
    ids.dedup();

    let profiles: HashMap<i32, configuration_profile::Model> =
        SelectQuery::<ConfigurationProfile>::new()
            .one_of(configuration_profile::Column::Id, ids)
            .all(db, dialect)
            .await?
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let profile = profiles.get(&row.configuration)?;
            Some(ClusterConfiguration::from_parts(row, profile))
        })
        .collect())
}
