//! Database migrations for the configuration controller.
//!
//! This module contains all database migrations using SeaORM Migration.
//! Every foreign key cascades on delete, so removing a cluster removes its
//! configuration assignments and triggers in the same statement.

pub use sea_orm_migration::prelude::*;

mod m2026_10_01_000001_create_cluster;
mod m2026_10_01_000002_create_configuration_profile;
mod m2026_10_01_000003_create_operator_configuration;
mod m2026_10_01_000004_create_trigger_type;
mod m2026_10_01_000005_create_trigger;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_10_01_000001_create_cluster::Migration),
            Box::new(m2026_10_01_000002_create_configuration_profile::Migration),
            Box::new(m2026_10_01_000003_create_operator_configuration::Migration),
            Box::new(m2026_10_01_000004_create_trigger_type::Migration),
            Box::new(m2026_10_01_000005_create_trigger::Migration),
        ]
    }
}
