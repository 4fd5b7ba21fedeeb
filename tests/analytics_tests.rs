//! Scan-event aggregation tests over a temporary SQLite database.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use qrlink::analytics::{Aggregator, Dimension, ScanEvent, ScanEventStore};
use qrlink::config::DatabaseConfig;
use qrlink::services::DeviceClass;
use qrlink::storages::SeaOrmStore;
use qrlink::utils::DateRange;

async fn create_temp_store() -> (Arc<SeaOrmStore>, TempDir) {
    let td = TempDir::new().unwrap();
    let path = td.path().join("analytics_test.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        pool_size: 5,
    };
    let store = SeaOrmStore::new(&config).await.unwrap();
    (Arc::new(store), td)
}

struct EventSpec<'a> {
    occurred_at: DateTime<Utc>,
    client_ip: &'a str,
    country: Option<&'a str>,
    device_class: DeviceClass,
    browser: Option<&'a str>,
}

fn event(link_id: &str, owner_id: &str, spec: EventSpec<'_>) -> ScanEvent {
    ScanEvent {
        event_id: Uuid::new_v4().to_string(),
        link_id: link_id.to_string(),
        owner_id: owner_id.to_string(),
        occurred_at: spec.occurred_at,
        client_ip: spec.client_ip.to_string(),
        country: spec.country.map(String::from),
        city: None,
        user_agent_raw: None,
        device_class: spec.device_class,
        os_name: None,
        browser_name: spec.browser.map(String::from),
        referrer: None,
    }
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

#[tokio::test]
async fn totals_count_scans_and_distinct_clients() {
    let (store, _td) = create_temp_store().await;

    for (ip, hour) in [("203.0.113.1", 9), ("203.0.113.1", 10), ("203.0.113.2", 11)] {
        store
            .insert_event(event(
                "link-1",
                "owner-1",
                EventSpec {
                    occurred_at: at(2026, 8, 10, hour),
                    client_ip: ip,
                    country: Some("DE"),
                    device_class: DeviceClass::Mobile,
                    browser: Some("Chrome"),
                },
            ))
            .await
            .unwrap();
    }

    let range = DateRange::new(at(2026, 8, 10, 0), at(2026, 8, 11, 0));
    let totals = store.totals("owner-1", Some("link-1"), range).await.unwrap();
    assert_eq!(totals.scan_count, 3);
    assert_eq!(totals.unique_clients, 2);

    // Other owners see nothing
    let totals = store.totals("owner-2", None, range).await.unwrap();
    assert_eq!(totals.scan_count, 0);
    assert_eq!(totals.unique_clients, 0);
}

#[tokio::test]
async fn range_is_half_open() {
    let (store, _td) = create_temp_store().await;

    for hour in [0, 12] {
        store
            .insert_event(event(
                "link-1",
                "owner-1",
                EventSpec {
                    occurred_at: at(2026, 8, 11, hour),
                    client_ip: "203.0.113.1",
                    country: None,
                    device_class: DeviceClass::Desktop,
                    browser: None,
                },
            ))
            .await
            .unwrap();
    }

    // [aug 10, aug 11): the midnight event on the 11th is excluded
    let range = DateRange::new(at(2026, 8, 10, 0), at(2026, 8, 11, 0));
    let totals = store.totals("owner-1", None, range).await.unwrap();
    assert_eq!(totals.scan_count, 0);

    // [aug 11, aug 12): both included, midnight boundary is inclusive
    let range = DateRange::new(at(2026, 8, 11, 0), at(2026, 8, 12, 0));
    let totals = store.totals("owner-1", None, range).await.unwrap();
    assert_eq!(totals.scan_count, 2);
}

#[tokio::test]
async fn breakdown_buckets_null_and_empty_as_unknown() {
    let (store, _td) = create_temp_store().await;
    let aggregator = Aggregator::new(store.clone() as Arc<dyn ScanEventStore>);

    let specs = [
        (Some("DE"), "203.0.113.1"),
        (Some("DE"), "203.0.113.2"),
        (None, "203.0.113.3"),
        (Some(""), "203.0.113.4"),
        (Some("FR"), "203.0.113.5"),
    ];
    for (country, ip) in specs {
        store
            .insert_event(event(
                "link-1",
                "owner-1",
                EventSpec {
                    occurred_at: at(2026, 8, 10, 12),
                    client_ip: ip,
                    country,
                    device_class: DeviceClass::Desktop,
                    browser: None,
                },
            ))
            .await
            .unwrap();
    }

    let range = DateRange::new(at(2026, 8, 10, 0), at(2026, 8, 11, 0));
    let buckets = aggregator
        .breakdown("owner-1", Some("link-1"), range, Dimension::Country)
        .await
        .unwrap();

    assert_eq!(buckets[0].value, "DE");
    assert_eq!(buckets[0].count, 2);
    // NULL and "" fold into one "Unknown" bucket
    let unknown = buckets.iter().find(|b| b.value == "Unknown").unwrap();
    assert_eq!(unknown.count, 2);
    let fr = buckets.iter().find(|b| b.value == "FR").unwrap();
    assert_eq!(fr.count, 1);
}

#[tokio::test]
async fn breakdown_returns_top_five_descending() {
    let (store, _td) = create_temp_store().await;
    let aggregator = Aggregator::new(store.clone() as Arc<dyn ScanEventStore>);

    let browsers = ["Chrome", "Chrome", "Chrome", "Firefox", "Firefox", "Safari", "Edge", "Opera", "Brave"];
    for (i, browser) in browsers.iter().enumerate() {
        store
            .insert_event(event(
                "link-1",
                "owner-1",
                EventSpec {
                    occurred_at: at(2026, 8, 10, 12),
                    client_ip: &format!("203.0.113.{}", i + 1),
                    country: None,
                    device_class: DeviceClass::Desktop,
                    browser: Some(browser),
                },
            ))
            .await
            .unwrap();
    }

    let range = DateRange::new(at(2026, 8, 10, 0), at(2026, 8, 11, 0));
    let buckets = aggregator
        .breakdown("owner-1", None, range, Dimension::Browser)
        .await
        .unwrap();

    assert_eq!(buckets.len(), 5);
    assert_eq!(buckets[0].value, "Chrome");
    assert_eq!(buckets[0].count, 3);
    assert_eq!(buckets[1].value, "Firefox");
    assert_eq!(buckets[1].count, 2);
    for pair in buckets.windows(2) {
        assert!(pair[0].count >= pair[1].count);
    }
}

#[tokio::test]
async fn time_series_is_sparse_and_ascending() {
    let (store, _td) = create_temp_store().await;
    let aggregator = Aggregator::new(store.clone() as Arc<dyn ScanEventStore>);

    // Two scans on the 10th, none on the 11th, one on the 12th
    for (day, hour, ip) in [(10, 9, "203.0.113.1"), (10, 15, "203.0.113.2"), (12, 9, "203.0.113.3")] {
        store
            .insert_event(event(
                "link-1",
                "owner-1",
                EventSpec {
                    occurred_at: at(2026, 8, day, hour),
                    client_ip: ip,
                    country: None,
                    device_class: DeviceClass::Mobile,
                    browser: None,
                },
            ))
            .await
            .unwrap();
    }

    let range = DateRange::new(at(2026, 8, 9, 0), at(2026, 8, 13, 0));
    let points = aggregator
        .time_series("owner-1", Some("link-1"), range)
        .await
        .unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].day, "2026-08-10");
    assert_eq!(points[0].count, 2);
    assert_eq!(points[1].day, "2026-08-12");
    assert_eq!(points[1].count, 1);
}

#[tokio::test]
async fn summary_composes_totals_and_breakdowns() {
    let (store, _td) = create_temp_store().await;
    let aggregator = Aggregator::new(store.clone() as Arc<dyn ScanEventStore>);

    for (ip, device) in [
        ("203.0.113.1", DeviceClass::Mobile),
        ("203.0.113.2", DeviceClass::Mobile),
        ("203.0.113.3", DeviceClass::Bot),
    ] {
        store
            .insert_event(event(
                "link-1",
                "owner-1",
                EventSpec {
                    occurred_at: at(2026, 8, 10, 12),
                    client_ip: ip,
                    country: Some("DE"),
                    device_class: device,
                    browser: Some("Chrome"),
                },
            ))
            .await
            .unwrap();
    }

    let range = DateRange::new(at(2026, 8, 10, 0), at(2026, 8, 11, 0));
    let summary = aggregator
        .summary("owner-1", Some("link-1"), range)
        .await
        .unwrap();

    assert_eq!(summary.total_scans, 3);
    assert_eq!(summary.unique_clients, 3);
    assert_eq!(summary.devices[0].value, "Mobile");
    assert_eq!(summary.devices[0].count, 2);
    assert_eq!(summary.countries[0].value, "DE");
    assert_eq!(summary.browsers[0].value, "Chrome");
}

#[tokio::test]
async fn all_time_range_reaches_old_events() {
    let (store, _td) = create_temp_store().await;

    store
        .insert_event(event(
            "link-1",
            "owner-1",
            EventSpec {
                occurred_at: Utc::now() - Duration::days(400),
                client_ip: "203.0.113.1",
                country: None,
                device_class: DeviceClass::Desktop,
                browser: None,
            },
        ))
        .await
        .unwrap();

    let recent = store
        .totals("owner-1", None, DateRange::default_range())
        .await
        .unwrap();
    assert_eq!(recent.scan_count, 0);

    let all_time = store
        .totals("owner-1", None, DateRange::all_time())
        .await
        .unwrap();
    assert_eq!(all_time.scan_count, 1);
}
