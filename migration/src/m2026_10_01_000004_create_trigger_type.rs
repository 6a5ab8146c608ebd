//! Migration to create the trigger_type table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TriggerType::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TriggerType::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TriggerType::Type).text().not_null())
                    .col(
                        ColumnDef::new(TriggerType::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trigger_type_type")
                    .table(TriggerType::Table)
                    .col(TriggerType::Type)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_trigger_type_type").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TriggerType::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TriggerType {
    Table,
    Id,
    Type,
    Description,
}
