//! Cluster entity model
//!
//! This module contains the SeaORM entity model for the cluster table,
//! which stores the managed remote clusters.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cluster entity representing a managed remote system
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "cluster")]
#[schema(as = Cluster)]
pub struct Model {
    /// Surrogate key assigned by storage
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique external identifier, typically a UUID
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cluster_configuration::Entity")]
    ClusterConfiguration,
    #[sea_orm(has_many = "super::trigger::Entity")]
    Trigger,
}

impl Related<super::cluster_configuration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClusterConfiguration.def()
    }
}

impl Related<super::trigger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trigger.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
