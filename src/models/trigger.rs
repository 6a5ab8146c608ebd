//! Trigger entity model
//!
//! A trigger is a diagnostic action requested against a cluster. It starts
//! active, may be toggled by id and is acknowledged by setting `acked_at`.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "trigger")]
#[schema(as = Trigger)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Id of the registered trigger type
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub trigger_type: i32,

    /// Id of the target cluster
    pub cluster: i32,

    pub reason: String,

    pub link: String,

    #[schema(value_type = String, format = DateTime)]
    pub triggered_at: DateTimeWithTimeZone,

    pub triggered_by: String,

    /// Set once the cluster's agent acknowledged the trigger
    #[schema(value_type = Option<String>, format = DateTime)]
    pub acked_at: Option<DateTimeWithTimeZone>,

    pub parameters: String,

    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trigger_type::Entity",
        from = "Column::TriggerType",
        to = "super::trigger_type::Column::Id",
        on_delete = "Cascade"
    )]
    TriggerType,
    #[sea_orm(
        belongs_to = "super::cluster::Entity",
        from = "Column::Cluster",
        to = "super::cluster::Column::Id",
        on_delete = "Cascade"
    )]
    Cluster,
}

impl Related<super::trigger_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TriggerType.def()
    }
}

impl Related<super::cluster::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cluster.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
