//! Links table migration
//!
//! Creates the `links` table. The unique index on `short_code` is the
//! only mutual-exclusion mechanism on the creation path: two concurrent
//! creations claiming the same code are serialized by the store itself.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Links::OwnerId).string_len(36).not_null())
                    .col(ColumnDef::new(Links::ProjectId).string_len(36).null())
                    .col(ColumnDef::new(Links::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Links::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Links::ShortCode).string_len(64).not_null())
                    .col(ColumnDef::new(Links::Destination).text().not_null())
                    .col(ColumnDef::new(Links::Style).text().null())
                    .col(
                        ColumnDef::new(Links::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Links::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Links::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index on short_code; collision detection on the
        // creation path depends on it
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_short_code")
                    .table(Links::Table)
                    .col(Links::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_owner_id")
                    .table(Links::Table)
                    .col(Links::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_links_owner_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_links_short_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Links {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    OwnerId,
    ProjectId,
    Name,
    Kind,
    ShortCode,
    Destination,
    Style,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
