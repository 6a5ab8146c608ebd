//! Trigger type entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registered kind of diagnostic trigger, e.g. `must-gather`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "trigger_type")]
#[schema(as = TriggerType)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique type name
    #[sea_orm(column_name = "type", unique)]
    #[serde(rename = "type")]
    pub trigger_type: String,

    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trigger::Entity")]
    Trigger,
}

impl Related<super::trigger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trigger.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
