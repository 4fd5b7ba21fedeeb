//! Read-side aggregation over the scan-event log
//!
//! Serves dashboard queries independently of the write path. Totals are
//! load-bearing for a summary response; breakdowns are supplementary
//! and degrade to empty on their own failures.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{BucketCount, Dimension, ScanEventStore, ScanSummary, ScanTotals, TimePoint};
use crate::errors::{QrLinkError, Result};
use crate::utils::DateRange;

/// Breakdowns report the top N values per dimension.
const BREAKDOWN_LIMIT: u64 = 5;

/// Label for NULL/empty dimension values. They are bucketed, not
/// dropped, so "no data" is visible on the dashboard.
const UNKNOWN_BUCKET: &str = "Unknown";

pub struct Aggregator {
    events: Arc<dyn ScanEventStore>,
}

impl Aggregator {
    pub fn new(events: Arc<dyn ScanEventStore>) -> Self {
        Self { events }
    }

    pub async fn totals(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
    ) -> Result<ScanTotals> {
        self.events
            .totals(owner_id, link_id, range)
            .await
            .map_err(|e| QrLinkError::database_operation(format!("Totals query failed: {}", e)))
    }

    /// Top-5 values for one dimension, count descending. NULL and empty
    /// raw values are merged into a single "Unknown" bucket.
    pub async fn breakdown(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
        dimension: Dimension,
    ) -> Result<Vec<BucketCount>> {
        let rows = self
            .events
            .breakdown(owner_id, link_id, range, dimension, BREAKDOWN_LIMIT)
            .await
            .map_err(|e| {
                QrLinkError::database_operation(format!(
                    "Breakdown query for {:?} failed: {}",
                    dimension, e
                ))
            })?;

        let mut buckets: Vec<BucketCount> = Vec::with_capacity(rows.len());
        for (value, count) in rows {
            let label = match value {
                Some(v) if !v.is_empty() => v,
                _ => UNKNOWN_BUCKET.to_string(),
            };
            // NULL and "" both map to "Unknown"; fold them together
            match buckets.iter_mut().find(|b| b.value == label) {
                Some(bucket) => bucket.count += count,
                None => buckets.push(BucketCount {
                    value: label,
                    count,
                }),
            }
        }
        buckets.sort_by(|a, b| b.count.cmp(&a.count));
        buckets.truncate(BREAKDOWN_LIMIT as usize);

        Ok(buckets)
    }

    /// Calendar-day scan counts, ascending and sparse. Days with zero
    /// scans are omitted; callers must not assume contiguous days.
    pub async fn time_series(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<TimePoint>> {
        let rows = self
            .events
            .time_series(owner_id, link_id, range)
            .await
            .map_err(|e| {
                QrLinkError::database_operation(format!("Time series query failed: {}", e))
            })?;

        Ok(rows
            .into_iter()
            .map(|(day, count)| TimePoint { day, count })
            .collect())
    }

    /// Full dashboard summary. Totals failing aborts the whole
    /// aggregate; each breakdown failing independently yields an empty
    /// list for that dimension alone.
    pub async fn summary(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
    ) -> Result<ScanSummary> {
        let totals = self.totals(owner_id, link_id, range).await?;

        let countries = self
            .breakdown_or_empty(owner_id, link_id, range, Dimension::Country)
            .await;
        let devices = self
            .breakdown_or_empty(owner_id, link_id, range, Dimension::DeviceClass)
            .await;
        let browsers = self
            .breakdown_or_empty(owner_id, link_id, range, Dimension::Browser)
            .await;

        debug!(
            "Summary for owner {} (link {:?}): {} scans, {} unique",
            owner_id, link_id, totals.scan_count, totals.unique_clients
        );

        Ok(ScanSummary {
            total_scans: totals.scan_count,
            unique_clients: totals.unique_clients,
            countries,
            devices,
            browsers,
        })
    }

    async fn breakdown_or_empty(
        &self,
        owner_id: &str,
        link_id: Option<&str>,
        range: DateRange,
        dimension: Dimension,
    ) -> Vec<BucketCount> {
        match self.breakdown(owner_id, link_id, range, dimension).await {
            Ok(buckets) => buckets,
            Err(e) => {
                warn!("{:?} breakdown degraded to empty: {}", dimension, e);
                Vec::new()
            }
        }
    }
}
