//! # Configuration Profile Repository
//!
//! Profiles hold the configuration text verbatim. The engine never parses
//! it, so whatever bytes are stored come back unchanged.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;

use super::{now, require_name};
use crate::error::RepositoryError;
use crate::models::configuration_profile::{
    self, ActiveModel as ProfileActiveModel, Entity as ConfigurationProfile,
};
use crate::storage::{SelectQuery, Storage};

pub struct ConfigurationProfileRepository<'a> {
    storage: &'a Storage,
}

impl<'a> ConfigurationProfileRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<configuration_profile::Model>, RepositoryError> {
        let db = self.storage.connection()?;
        SelectQuery::<ConfigurationProfile>::new()
            .all(db, self.storage.dialect())
            .await
    }

    pub async fn get_by_id(
        &self,
        id: i32,
    ) -> Result<configuration_profile::Model, RepositoryError> {
        let db = self.storage.connection()?;
        SelectQuery::<ConfigurationProfile>::new()
            .equals(configuration_profile::Column::Id, Some(id))
            .one(db, self.storage.dialect())
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("configuration profile {id}")))
    }

    /// Stores a new profile and returns the full profile list.
    pub async fn create(
        &self,
        user: &str,
        description: &str,
        configuration: &str,
    ) -> Result<Vec<configuration_profile::Model>, RepositoryError> {
        require_name("user", user)?;
        let db = self.storage.connection()?;

        let row = ProfileActiveModel {
            configuration: Set(configuration.to_string()),
            changed_at: Set(now()),
            changed_by: Set(user.to_string()),
            description: Set(description.to_string()),
            ..Default::default()
        };
        let id = ConfigurationProfile::insert(row)
            .exec(db)
            .await
            .map_err(RepositoryError::database_error)?
            .last_insert_id;

        info!(profile_id = id, user, "configuration profile created");
        self.list().await
    }

    /// Replaces the text and description of profile `id`.
    pub async fn change(
        &self,
        id: i32,
        user: &str,
        description: &str,
        configuration: &str,
    ) -> Result<Vec<configuration_profile::Model>, RepositoryError> {
        require_name("user", user)?;
        let db = self.storage.connection()?;

        let result = ConfigurationProfile::update_many()
            .col_expr(
                configuration_profile::Column::Configuration,
                Expr::value(configuration),
            )
            .col_expr(
                configuration_profile::Column::Description,
                Expr::value(description),
            )
            .col_expr(configuration_profile::Column::ChangedBy, Expr::value(user))
            .col_expr(configuration_profile::Column::ChangedAt, Expr::value(now()))
            .filter(configuration_profile::Column::Id.eq(id))
            .exec(db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!(
                "configuration profile {id}"
            )));
        }

        info!(profile_id = id, user, "configuration profile changed");
        self.list().await
    }

    /// Deletes the profile along with every cluster assignment using it.
    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let db = self.storage.connection()?;
        let result = ConfigurationProfile::delete_many()
            .filter(configuration_profile::Column::Id.eq(id))
            .exec(db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!(
                "configuration profile {id}"
            )));
        }
        Ok(())
    }
}
