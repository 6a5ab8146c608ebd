//! # Trigger Type Repository

use sea_orm::{EntityTrait, Set};
use tracing::info;

use super::require_name;
use crate::error::RepositoryError;
use crate::models::trigger_type::{self, ActiveModel as TriggerTypeActiveModel, Entity as TriggerType};
use crate::storage::{SelectQuery, Storage};

pub struct TriggerTypeRepository<'a> {
    storage: &'a Storage,
}

impl<'a> TriggerTypeRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<trigger_type::Model>, RepositoryError> {
        let db = self.storage.connection()?;
        SelectQuery::<TriggerType>::new()
            .all(db, self.storage.dialect())
            .await
    }

    /// Registers a trigger type and returns its id.
    pub async fn create(&self, type_name: &str, description: &str) -> Result<i32, RepositoryError> {
        require_name("trigger type", type_name)?;
        let db = self.storage.connection()?;

        let row = TriggerTypeActiveModel {
            trigger_type: Set(type_name.to_string()),
            description: Set(description.to_string()),
            ..Default::default()
        };
        let id = TriggerType::insert(row).exec(db).await?.last_insert_id;

        info!(trigger_type_id = id, trigger_type = type_name, "trigger type registered");
        Ok(id)
    }

    /// Id of the type named `type_name`
    pub async fn get_id_by_type(&self, type_name: &str) -> Result<i32, RepositoryError> {
        let db = self.storage.connection()?;
        SelectQuery::<TriggerType>::new()
            .equals(trigger_type::Column::TriggerType, Some(type_name))
            .one(db, self.storage.dialect())
            .await?
            .map(|row| row.id)
            .ok_or_else(|| RepositoryError::not_found(format!("trigger type '{type_name}'")))
    }
}
