pub mod aggregator;
pub mod sink;

pub use aggregator::Aggregator;
pub use sink::ScanEventStore;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::services::ua_classifier::{DeviceClass, UaProfile};

/// What the resolver captures from a scan before handing off to the
/// recorder. Carries no identity or timestamp yet; those are assigned
/// at record time.
#[derive(Debug, Clone)]
pub struct ScanCapture {
    pub link_id: String,
    /// Denormalized from the link so dashboard queries never join
    pub owner_id: String,
    pub client_ip: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub user_agent_raw: Option<String>,
    pub profile: UaProfile,
    pub referrer: Option<String>,
}

/// One recorded scan. Immutable once written; the referenced link may
/// be deleted later, the event row stays (append-only log semantics).
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub event_id: String,
    pub link_id: String,
    pub owner_id: String,
    /// UTC instant of the scan itself, not of the durable write
    pub occurred_at: DateTime<Utc>,
    pub client_ip: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub user_agent_raw: Option<String>,
    pub device_class: DeviceClass,
    pub os_name: Option<String>,
    pub browser_name: Option<String>,
    pub referrer: Option<String>,
}

impl ScanEvent {
    /// Stamp a capture with a fresh event identity and the scan instant.
    pub fn record(capture: ScanCapture) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            link_id: capture.link_id,
            owner_id: capture.owner_id,
            occurred_at: Utc::now(),
            client_ip: capture.client_ip,
            country: capture.country,
            city: capture.city,
            user_agent_raw: capture.user_agent_raw,
            device_class: capture.profile.device_class,
            os_name: capture.profile.os_name,
            browser_name: capture.profile.browser_name,
            referrer: capture.referrer,
        }
    }
}

/// Breakdown dimensions the dashboards group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Country,
    DeviceClass,
    Browser,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanTotals {
    pub scan_count: u64,
    /// Distinct client IPs in range: a coarse unique-visitor proxy that
    /// knowingly conflates NAT'd users
    pub unique_clients: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimePoint {
    /// Calendar day bucket, `YYYY-MM-DD`
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub total_scans: u64,
    pub unique_clients: u64,
    pub countries: Vec<BucketCount>,
    pub devices: Vec<BucketCount>,
    pub browsers: Vec<BucketCount>,
}
