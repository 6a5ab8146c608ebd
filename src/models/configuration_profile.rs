//! Configuration profile entity model
//!
//! Profiles are reusable blobs of configuration text. The text is opaque to
//! the controller and is persisted exactly as submitted.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "configuration_profile")]
#[schema(as = ConfigurationProfile)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Configuration text, stored verbatim
    #[sea_orm(column_type = "Text")]
    pub configuration: String,

    /// Timestamp of the last mutation
    #[schema(value_type = String, format = DateTime)]
    pub changed_at: DateTimeWithTimeZone,

    /// User who performed the last mutation
    pub changed_by: String,

    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cluster_configuration::Entity")]
    ClusterConfiguration,
}

impl Related<super::cluster_configuration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClusterConfiguration.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
