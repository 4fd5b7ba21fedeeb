//! Scan-event log operations
//!
//! Append path for the recorder workers plus the grouped reads behind
//! the dashboards. All range filters are half-open `[from, to)`.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use tracing::debug;

use super::SeaOrmStore;
use crate::analytics::{Dimension, ScanEvent, ScanEventStore, ScanTotals};
use crate::utils::DateRange;

use migration::entities::scan_event;

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    scans: i64,
    unique_clients: i64,
}

#[derive(Debug, FromQueryResult)]
struct BucketRow {
    value: Option<String>,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct DayRow {
    bucket: String,
    count: i64,
}

fn dimension_column(dimension: Dimension) -> scan_event::Column {
    match dimension {
        Dimension::Country => scan_event::Column::Country,
        Dimension::DeviceClass => scan_event::Column::DeviceClass,
        Dimension::Browser => scan_event::Column::BrowserName,
    }
}

/// Shared owner/link/range filter for all aggregate reads.
fn scoped(
    owner_id: &str,
    link_id: Option<&str>,
    range: DateRange,
) -> Select<scan_event::Entity> {
    let mut query = scan_event::Entity::find()
        .filter(scan_event::Column::OwnerId.eq(owner_id))
        .filter(scan_event::Column::OccurredAt.gte(range.from))
        .filter(scan_event::Column::OccurredAt.lt(range.to));

    if let Some(link_id) = link_id {
        query = query.filter(scan_event::Column::LinkId.eq(link_id));
    }

    query
}

#[async_trait]
impl ScanEventStore for SeaOrmStore {
    async fn insert_event(&self, event: ScanEvent) -> anyhow::Result<()> {
        let model = scan_event::ActiveModel {
            id: Set(event.event_id),
            link_id: Set(event.link_id),
            owner_id: Set(event.owner_id),
            occurred_at: Set(event.occurred_at),
            client_ip: Set(event.client_ip),
            country: Set(event.country),
            city: Set(event.city),
            user_agent_raw: Set(event.user_agent_raw),
            device_class: Set(event.device_class.as_str().to_string()),
            os_name: Set(event.os_name),
            browser_name: Set(event.browser_name),
            referrer: Set(event.referrer),
        };

        scan_event::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert scan event: {}", e))?;

        Ok(())
    }

    async fn totals(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
    ) -> anyhow::Result<ScanTotals> {
        let row = scoped(owner_id, link_id, range)
            .select_only()
            .column_as(scan_event::Column::Id.count(), "scans")
            .column_as(Expr::cust("COUNT(DISTINCT client_ip)"), "unique_clients")
            .into_model::<TotalsRow>()
            .one(&self.db)
            .await?;

        // An aggregate over zero rows still yields one row of zeros;
        // None only happens on exotic backends, treat it the same
        let row = row.unwrap_or(TotalsRow {
            scans: 0,
            unique_clients: 0,
        });

        debug!(
            "Totals for owner {} on {}: {} scans",
            owner_id, self.backend_name, row.scans
        );

        Ok(ScanTotals {
            scan_count: row.scans.max(0) as u64,
            unique_clients: row.unique_clients.max(0) as u64,
        })
    }

    async fn breakdown(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
        dimension: Dimension,
        limit: u64,
    ) -> anyhow::Result<Vec<(Option<String>, u64)>> {
        let column = dimension_column(dimension);

        let rows = scoped(owner_id, link_id, range)
            .select_only()
            .column_as(Expr::col(column), "value")
            .column_as(scan_event::Column::Id.count(), "count")
            .group_by(column)
            .order_by_desc(Expr::cust("count"))
            .limit(limit)
            .into_model::<BucketRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.value, row.count.max(0) as u64))
            .collect())
    }

    async fn time_series(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
    ) -> anyhow::Result<Vec<(String, u64)>> {
        let day_expr = self.day_bucket_expr();

        let rows = scoped(owner_id, link_id, range)
            .select_only()
            .column_as(day_expr.clone(), "bucket")
            .column_as(scan_event::Column::Id.count(), "count")
            .group_by(day_expr)
            .order_by_asc(Expr::cust("bucket"))
            .into_model::<DayRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.bucket, row.count.max(0) as u64))
            .collect())
    }
}
