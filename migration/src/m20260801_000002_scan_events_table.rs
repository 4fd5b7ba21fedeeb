//! Scan events table migration
//!
//! Creates the append-only `scan_events` log. Rows reference a link but
//! carry no foreign key: events survive link deletion and are never
//! updated or cascaded.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScanEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScanEvents::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScanEvents::LinkId).string_len(36).not_null())
                    .col(
                        ColumnDef::new(ScanEvents::OwnerId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScanEvents::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScanEvents::ClientIp)
                            .string_len(45)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScanEvents::Country).string_len(64).null())
                    .col(ColumnDef::new(ScanEvents::City).string_len(100).null())
                    .col(ColumnDef::new(ScanEvents::UserAgentRaw).text().null())
                    .col(
                        ColumnDef::new(ScanEvents::DeviceClass)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScanEvents::OsName).string_len(64).null())
                    .col(ColumnDef::new(ScanEvents::BrowserName).string_len(64).null())
                    .col(ColumnDef::new(ScanEvents::Referrer).text().null())
                    .to_owned(),
            )
            .await?;

        // Owner-scoped range scans back every dashboard query
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_scan_events_owner_time")
                    .table(ScanEvents::Table)
                    .col(ScanEvents::OwnerId)
                    .col(ScanEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        // Per-link time series
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_scan_events_link_time")
                    .table(ScanEvents::Table)
                    .col(ScanEvents::LinkId)
                    .col(ScanEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_scan_events_link_time").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_scan_events_owner_time").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ScanEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScanEvents {
    #[sea_orm(iden = "scan_events")]
    Table,
    Id,
    LinkId,
    OwnerId,
    OccurredAt,
    ClientIp,
    Country,
    City,
    UserAgentRaw,
    DeviceClass,
    OsName,
    BrowserName,
    Referrer,
}
