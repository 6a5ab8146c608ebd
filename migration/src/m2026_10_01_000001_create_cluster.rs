//! Migration to create the cluster table.
//!
//! Clusters are addressed externally by their unique name (usually a UUID);
//! the integer id is a surrogate key referenced by the other tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cluster::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cluster::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cluster::Name).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cluster_name")
                    .table(Cluster::Table)
                    .col(Cluster::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_cluster_name").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Cluster::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cluster {
    Table,
    Id,
    Name,
}
