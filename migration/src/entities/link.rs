//! Link entity: durable mapping from short code to destination metadata

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub project_id: Option<String>,
    pub name: String,
    /// "dynamic" for tracked redirects, the literal type tag otherwise
    pub kind: String,
    #[sea_orm(unique)]
    pub short_code: String,
    #[sea_orm(column_type = "Text")]
    pub destination: String,
    /// Opaque renderer style blob (JSON object), pass-through only
    #[sea_orm(column_type = "Text", nullable)]
    pub style: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
