//! Scan event entity: one row per recorded scan, append-only

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "scan_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub link_id: String,
    /// Denormalized from the link at record time for query efficiency
    pub owner_id: String,
    pub occurred_at: DateTimeUtc,
    pub client_ip: String,
    pub country: Option<String>,
    pub city: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent_raw: Option<String>,
    pub device_class: String,
    pub os_name: Option<String>,
    pub browser_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
