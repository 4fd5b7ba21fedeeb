use async_trait::async_trait;

use super::{Dimension, ScanEvent, ScanTotals};
use crate::utils::DateRange;

/// Durable scan-event log: append on the write side, aggregate reads on
/// the dashboard side. Appends must be atomic per event and safe under
/// concurrent recorder workers; no cross-event ordering is guaranteed.
#[async_trait]
pub trait ScanEventStore: Send + Sync {
    async fn insert_event(&self, event: ScanEvent) -> anyhow::Result<()>;

    /// Scan count and distinct-client count for an owner (and optional
    /// link) over a half-open `[from, to)` range.
    async fn totals(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
    ) -> anyhow::Result<ScanTotals>;

    /// Raw grouped counts for one dimension, ordered by count
    /// descending. NULL buckets are returned as-is; labeling is the
    /// aggregator's concern.
    async fn breakdown(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
        dimension: Dimension,
        limit: u64,
    ) -> anyhow::Result<Vec<(Option<String>, u64)>>;

    /// Per-day counts, ascending, sparse: days without scans are absent.
    async fn time_series(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
    ) -> anyhow::Result<Vec<(String, u64)>>;
}
