//! Migration to create the operator_configuration table.
//!
//! Each row assigns a configuration profile to a cluster. The `active` flag
//! marks the row the cluster's agent should currently apply.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OperatorConfiguration::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OperatorConfiguration::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OperatorConfiguration::Cluster)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OperatorConfiguration::Configuration)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OperatorConfiguration::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OperatorConfiguration::ChangedBy)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OperatorConfiguration::Active)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OperatorConfiguration::Reason)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_operator_configuration_cluster")
                            .from(OperatorConfiguration::Table, OperatorConfiguration::Cluster)
                            .to(Cluster::Table, Cluster::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_operator_configuration_profile")
                            .from(
                                OperatorConfiguration::Table,
                                OperatorConfiguration::Configuration,
                            )
                            .to(ConfigurationProfile::Table, ConfigurationProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Active-configuration lookups always filter by cluster first
        manager
            .create_index(
                Index::create()
                    .name("idx_operator_configuration_cluster_active")
                    .table(OperatorConfiguration::Table)
                    .col(OperatorConfiguration::Cluster)
                    .col(OperatorConfiguration::Active)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_operator_configuration_cluster_active")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(OperatorConfiguration::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OperatorConfiguration {
    Table,
    Id,
    Cluster,
    Configuration,
    ChangedAt,
    ChangedBy,
    Active,
    Reason,
}

#[derive(DeriveIden)]
enum Cluster {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ConfigurationProfile {
    Table,
    Id,
}
