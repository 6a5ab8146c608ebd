//! # Trigger Repository
//!
//! Triggers ask a cluster's agent to run a diagnostic action. They are
//! created active, acknowledged by the agent and switched off explicitly.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::{info, instrument};

use super::{cluster_id_by_name, now, require_name};
use crate::error::RepositoryError;
use crate::models::trigger::{self, ActiveModel as TriggerActiveModel, Column, Entity as Trigger};
use crate::storage::{SelectQuery, Storage};

/// Fields of a trigger as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct NewTrigger {
    pub cluster: String,
    pub trigger_type: String,
    pub user: String,
    pub reason: String,
    pub link: String,
    pub parameters: String,
}

pub struct TriggerRepository<'a> {
    storage: &'a Storage,
}

impl<'a> TriggerRepository<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<trigger::Model>, RepositoryError> {
        let db = self.storage.connection()?;
        SelectQuery::<Trigger>::new()
            .all(db, self.storage.dialect())
            .await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<trigger::Model, RepositoryError> {
        let db = self.storage.connection()?;
        SelectQuery::<Trigger>::new()
            .equals(Column::Id, Some(id))
            .one(db, self.storage.dialect())
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("trigger {id}")))
    }

    /// Every trigger recorded for `cluster`
    pub async fn list_for_cluster(&self, cluster: &str) -> Result<Vec<trigger::Model>, RepositoryError> {
        self.cluster_triggers(cluster, false).await
    }

    /// Triggers of `cluster` that have not been switched off
    pub async fn list_active_for_cluster(
        &self,
        cluster: &str,
    ) -> Result<Vec<trigger::Model>, RepositoryError> {
        self.cluster_triggers(cluster, true).await
    }

    async fn cluster_triggers(
        &self,
        cluster: &str,
        only_active: bool,
    ) -> Result<Vec<trigger::Model>, RepositoryError> {
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();
        let cluster_id = cluster_id_by_name(db, dialect, cluster, false).await?;

        SelectQuery::<Trigger>::new()
            .equals(Column::Cluster, Some(cluster_id))
            .equals(Column::Active, only_active.then_some(true))
            .all(db, dialect)
            .await
    }

    /// Records a new active trigger and returns its id.
    ///
    /// Both the cluster and the trigger type must already exist.
    #[instrument(skip(self, request), fields(cluster = %request.cluster, trigger_type = %request.trigger_type))]
    pub async fn new_trigger(&self, request: &NewTrigger) -> Result<i32, RepositoryError> {
        require_name("user", &request.user)?;
        let db = self.storage.connection()?;
        let dialect = self.storage.dialect();

        let type_id = self
            .storage
            .trigger_types()
            .get_id_by_type(&request.trigger_type)
            .await?;
        let cluster_id = cluster_id_by_name(db, dialect, &request.cluster, false).await?;

        let row = TriggerActiveModel {
            trigger_type: Set(type_id),
            cluster: Set(cluster_id),
            reason: Set(request.reason.clone()),
            link: Set(request.link.clone()),
            triggered_at: Set(now()),
            triggered_by: Set(request.user.clone()),
            acked_at: Set(None),
            parameters: Set(request.parameters.clone()),
            active: Set(true),
            ..Default::default()
        };
        let id = Trigger::insert(row).exec(db).await?.last_insert_id;

        info!(trigger_id = id, "trigger created");
        Ok(id)
    }

    /// Sets the `active` flag of trigger `id`.
    pub async fn change_state_by_id(&self, id: i32, active: bool) -> Result<(), RepositoryError> {
        let db = self.storage.connection()?;
        let result = Trigger::update_many()
            .col_expr(Column::Active, Expr::value(active))
            .filter(Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!("trigger {id}")));
        }
        info!(trigger_id = id, active, "trigger state changed");
        Ok(())
    }

    /// Stamps `acked_at` on a trigger owned by `cluster`.
    pub async fn ack(&self, cluster: &str, id: i32) -> Result<(), RepositoryError> {
        let db = self.storage.connection()?;
        let cluster_id = cluster_id_by_name(db, self.storage.dialect(), cluster, false).await?;

        let result = Trigger::update_many()
            .col_expr(Column::AckedAt, Expr::value(Some(now())))
            .filter(Column::Id.eq(id))
            .filter(Column::Cluster.eq(cluster_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!(
                "trigger {id} for cluster '{cluster}'"
            )));
        }
        info!(trigger_id = id, cluster, "trigger acknowledged");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let db = self.storage.connection()?;
        let result = Trigger::delete_many()
            .filter(Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!("trigger {id}")));
        }
        Ok(())
    }
}
