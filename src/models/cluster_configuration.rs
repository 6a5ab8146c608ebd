//! Cluster configuration entity model
//!
//! Rows of the `operator_configuration` table assign a configuration profile
//! to a cluster. At most one row per cluster carries `active = true`; the
//! activation swap lives in
//! [`ClusterConfigurationRepository`](crate::repositories::ClusterConfigurationRepository).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::configuration_profile;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "operator_configuration")]
#[schema(as = ClusterConfigurationRow)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Id of the owning cluster
    pub cluster: i32,

    /// Id of the assigned configuration profile
    pub configuration: i32,

    #[schema(value_type = String, format = DateTime)]
    pub changed_at: DateTimeWithTimeZone,

    pub changed_by: String,

    /// Whether the cluster's agent should apply this configuration
    pub active: bool,

    /// Free-form reason recorded with the last mutation
    pub reason: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cluster::Entity",
        from = "Column::Cluster",
        to = "super::cluster::Column::Id",
        on_delete = "Cascade"
    )]
    Cluster,
    #[sea_orm(
        belongs_to = "super::configuration_profile::Entity",
        from = "Column::Configuration",
        to = "super::configuration_profile::Column::Id",
        on_delete = "Cascade"
    )]
    ConfigurationProfile,
}

impl Related<super::cluster::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cluster.def()
    }
}

impl Related<super::configuration_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConfigurationProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Cluster configuration as returned to callers, carrying the text of the
/// assigned profile instead of only its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClusterConfiguration {
    pub id: i32,
    pub cluster: i32,
    /// Id of the configuration profile the text was taken from
    pub configuration_id: i32,
    /// Configuration text of the assigned profile
    pub configuration: String,
    #[schema(value_type = String, format = DateTime)]
    pub changed_at: DateTimeWithTimeZone,
    pub changed_by: String,
    pub active: bool,
    pub reason: String,
}

impl ClusterConfiguration {
    /// Joins an assignment row with the profile it references.
    pub fn from_parts(row: Model, profile: &configuration_profile::Model) -> Self {
        Self {
            id: row.id,
            cluster: row.cluster,
            configuration_id: row.configuration,
            configuration: profile.configuration.clone(),
            changed_at: row.changed_at,
            changed_by: row.changed_by,
            active: row.active,
            reason: row.reason,
        }
    }
}
