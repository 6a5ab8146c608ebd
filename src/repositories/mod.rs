//! # Repository Layer
//!
//! One repository per table. Each borrows the [`Storage`](crate::storage::Storage)
//! facade, reads through [`SelectQuery`](crate::storage::SelectQuery) and
//! reports failures as [`RepositoryError`].

pub mod cluster;
pub mod cluster_configuration;
pub mod configuration_profile;
pub mod trigger;
pub mod trigger_type;

pub use cluster::{ClusterLookup, ClusterRepository};
pub use cluster_configuration::ClusterConfigurationRepository;
pub use configuration_profile::ConfigurationProfileRepository;
pub use trigger::{NewTrigger, TriggerRepository};
pub use trigger_type::TriggerTypeRepository;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::error::RepositoryError;
use crate::models::cluster as cluster_model;
use crate::storage::{Dialect, SelectQuery};

const MAX_NAME_LEN: usize = 255;

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

/// Rejects blank or oversized identifiers such as cluster names and user names.
pub(crate) fn require_name(field: &str, value: &str) -> Result<(), RepositoryError> {
    if value.trim().is_empty() {
        return Err(RepositoryError::validation_error(format!(
            "{field} cannot be empty"
        )));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(RepositoryError::validation_error(format!(
            "{field} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Resolves a cluster name to its id on `db`, which may be a transaction.
///
/// With `lock` set the lookup starts with a no-op write to the cluster row.
/// On PostgreSQL that holds the row lock, on SQLite it takes the database
/// write lock up front, so a later write in the same transaction never has
/// to upgrade a read lock. Either way activation changes for one cluster are
/// serialized until the transaction ends.
pub(crate) async fn cluster_id_by_name<C: ConnectionTrait>(
    db: &C,
    dialect: Dialect,
    name: &str,
    lock: bool,
) -> Result<i32, RepositoryError> {
    let not_found = || RepositoryError::not_found(format!("cluster '{name}'"));

    if lock {
        let touched = cluster_model::Entity::update_many()
            .col_expr(
                cluster_model::Column::Name,
                Expr::col(cluster_model::Column::Name).into(),
            )
            .filter(cluster_model::Column::Name.eq(name))
            .exec(db)
            .await?;
        if touched.rows_affected == 0 {
            return Err(not_found());
        }
    }

    SelectQuery::<cluster_model::Entity>::new()
        .equals(cluster_model::Column::Name, Some(name))
        .one(db, dialect)
        .await?
        .map(|row| row.id)
        .ok_or_else(not_found)
}
