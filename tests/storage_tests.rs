//! SeaOrmStore integration tests over a temporary SQLite database.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use qrlink::config::DatabaseConfig;
use qrlink::errors::QrLinkError;
use qrlink::storages::{Link, LinkKind, LinkStore, SeaOrmStore};

async fn create_temp_store() -> (Arc<SeaOrmStore>, TempDir) {
    let td = TempDir::new().unwrap();
    let path = td.path().join("storage_test.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        pool_size: 5,
    };
    let store = SeaOrmStore::new(&config).await.unwrap();
    (Arc::new(store), td)
}

fn sample_link(code: &str, owner: &str) -> Link {
    let now = Utc::now();
    Link {
        id: Uuid::new_v4().to_string(),
        owner_id: owner.to_string(),
        project_id: None,
        name: "Campaign".to_string(),
        kind: LinkKind::Dynamic,
        short_code: code.to_string(),
        destination: "https://example.com/landing".to_string(),
        style: Some(json!({"fg": "#000000"})),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn insert_and_get_by_code_roundtrip() {
    let (store, _td) = create_temp_store().await;

    let link = sample_link("abc123", "owner-1");
    store.insert(&link).await.unwrap();

    let found = store.get_by_code("abc123").await.unwrap().unwrap();
    assert_eq!(found.id, link.id);
    assert_eq!(found.owner_id, "owner-1");
    assert!(found.kind.is_dynamic());
    assert_eq!(found.style, Some(json!({"fg": "#000000"})));
    assert!(found.is_active);
}

#[tokio::test]
async fn unknown_code_returns_none() {
    let (store, _td) = create_temp_store().await;
    assert!(store.get_by_code("nosuch").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_code_is_reported_distinctly() {
    let (store, _td) = create_temp_store().await;

    store.insert(&sample_link("dupe01", "owner-1")).await.unwrap();
    let err = store
        .insert(&sample_link("dupe01", "owner-2"))
        .await
        .unwrap_err();

    assert!(matches!(err, QrLinkError::DuplicateCode(_)));
}

#[tokio::test]
async fn get_for_owner_enforces_ownership() {
    let (store, _td) = create_temp_store().await;

    let link = sample_link("owned1", "owner-1");
    store.insert(&link).await.unwrap();

    assert!(store
        .get_for_owner(&link.id, "owner-1")
        .await
        .unwrap()
        .is_some());
    assert!(store
        .get_for_owner(&link.id, "owner-2")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn set_active_toggles_and_404s_on_missing() {
    let (store, _td) = create_temp_store().await;

    store.insert(&sample_link("togg01", "owner-1")).await.unwrap();

    store.set_active("togg01", false).await.unwrap();
    let link = store.get_by_code("togg01").await.unwrap().unwrap();
    assert!(!link.is_active);

    store.set_active("togg01", true).await.unwrap();
    let link = store.get_by_code("togg01").await.unwrap().unwrap();
    assert!(link.is_active);

    let err = store.set_active("absent", false).await.unwrap_err();
    assert!(matches!(err, QrLinkError::NotFound(_)));
}

#[tokio::test]
async fn static_kind_tag_survives_storage() {
    let (store, _td) = create_temp_store().await;

    let mut link = sample_link("wifi01", "owner-1");
    link.kind = LinkKind::Static("wifi".to_string());
    link.destination = "WIFI:T:WPA;S:guest;P:secret;;".to_string();
    link.style = None;
    store.insert(&link).await.unwrap();

    let found = store.get_by_code("wifi01").await.unwrap().unwrap();
    assert_eq!(found.kind.as_str(), "wifi");
    assert!(!found.kind.is_dynamic());
    assert!(found.style.is_none());
}
