//! Migration to create the trigger table.
//!
//! Triggers record diagnostic actions requested against a cluster. `acked_at`
//! stays NULL until the cluster's agent acknowledges the trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trigger::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trigger::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trigger::Type).integer().not_null())
                    .col(ColumnDef::new(Trigger::Cluster).integer().not_null())
                    .col(ColumnDef::new(Trigger::Reason).text().not_null().default(""))
                    .col(ColumnDef::new(Trigger::Link).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Trigger::TriggeredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Trigger::TriggeredBy).text().not_null())
                    .col(
                        ColumnDef::new(Trigger::AckedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Trigger::Parameters)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Trigger::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trigger_type")
                            .from(Trigger::Table, Trigger::Type)
                            .to(TriggerType::Table, TriggerType::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trigger_cluster")
                            .from(Trigger::Table, Trigger::Cluster)
                            .to(Cluster::Table, Cluster::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trigger_cluster")
                    .table(Trigger::Table)
                    .col(Trigger::Cluster)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_trigger_cluster").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Trigger::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Trigger {
    Table,
    Id,
    Type,
    Cluster,
    Reason,
    Link,
    TriggeredAt,
    TriggeredBy,
    AckedAt,
    Parameters,
    Active,
}

#[derive(DeriveIden)]
enum TriggerType {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Cluster {
    Table,
    Id,
}
