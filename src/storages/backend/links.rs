//! Link table operations

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, SqlErr};
use tracing::info;

use super::SeaOrmStore;
use crate::errors::{QrLinkError, Result};
use crate::storages::models::{Link, LinkKind};
use crate::storages::LinkStore;

use migration::entities::link;

pub fn model_to_link(model: link::Model) -> Result<Link> {
    let style = model
        .style
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    Ok(Link {
        id: model.id,
        owner_id: model.owner_id,
        project_id: model.project_id,
        name: model.name,
        kind: LinkKind::normalize(&model.kind),
        short_code: model.short_code,
        destination: model.destination,
        style,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub fn link_to_active_model(link: &Link) -> Result<link::ActiveModel> {
    let style = link
        .style
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    Ok(link::ActiveModel {
        id: Set(link.id.clone()),
        owner_id: Set(link.owner_id.clone()),
        project_id: Set(link.project_id.clone()),
        name: Set(link.name.clone()),
        kind: Set(link.kind.as_str().to_string()),
        short_code: Set(link.short_code.clone()),
        destination: Set(link.destination.clone()),
        style: Set(style),
        is_active: Set(link.is_active),
        created_at: Set(link.created_at),
        updated_at: Set(link.updated_at),
    })
}

#[async_trait]
impl LinkStore for SeaOrmStore {
    async fn insert(&self, new_link: &Link) -> Result<()> {
        let model = link_to_active_model(new_link)?;

        match link::Entity::insert(model).exec(&self.db).await {
            Ok(_) => {
                info!("Link {} stored with code {}", new_link.id, new_link.short_code);
                Ok(())
            }
            // The unique index on short_code is the collision detector
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(QrLinkError::duplicate_code(&new_link.short_code))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Link>> {
        link::Entity::find()
            .filter(link::Column::ShortCode.eq(code))
            .one(&self.db)
            .await?
            .map(model_to_link)
            .transpose()
    }

    async fn get_for_owner(&self, id: &str, owner_id: &str) -> Result<Option<Link>> {
        link::Entity::find()
            .filter(link::Column::Id.eq(id))
            .filter(link::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?
            .map(model_to_link)
            .transpose()
    }

    async fn set_active(&self, code: &str, active: bool) -> Result<()> {
        let result = link::Entity::update_many()
            .col_expr(link::Column::IsActive, Expr::value(active))
            .col_expr(link::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(link::Column::ShortCode.eq(code))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(QrLinkError::not_found(code));
        }

        info!("Link {} set active={}", code, active);
        Ok(())
    }
}
