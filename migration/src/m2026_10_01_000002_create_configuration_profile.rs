//! Migration to create the configuration_profile table.
//!
//! Profiles hold opaque configuration text which is stored verbatim.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConfigurationProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigurationProfile::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConfigurationProfile::Configuration)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConfigurationProfile::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ConfigurationProfile::ChangedBy)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConfigurationProfile::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConfigurationProfile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ConfigurationProfile {
    Table,
    Id,
    Configuration,
    ChangedAt,
    ChangedBy,
    Description,
}
