//! # Data Models
//!
//! SeaORM entity models for the controller's relational schema. Entities
//! refer to each other only through id columns; no model holds another.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod cluster;
pub mod cluster_configuration;
pub mod configuration_profile;
pub mod trigger;
pub mod trigger_type;

pub use cluster::Entity as Cluster;
pub use cluster_configuration::ClusterConfiguration;
pub use configuration_profile::Entity as ConfigurationProfile;
pub use trigger::Entity as Trigger;
pub use trigger_type::Entity as TriggerType;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "config-controller".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
