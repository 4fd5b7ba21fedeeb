//! Link creation
//!
//! Owns validation, short-code assignment, and the collision-retry
//! loop. Codes are random, so a duplicate insert is expected
//! occasionally; anything else propagates unchanged.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::errors::{QrLinkError, Result};
use crate::storages::{Link, LinkKind, LinkStore};
use crate::utils::generate_code;

/// Collision retries before giving up. At 62^6 codes three misses in a
/// row means the table is effectively saturated anyway.
const MAX_CODE_ATTEMPTS: u32 = 3;

const DEFAULT_NAME: &str = "My QR Code";

#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    pub owner_id: String,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub kind: String,
    pub destination: String,
    pub style: Option<Value>,
}

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    base_url: String,
    code_length: usize,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, base_url: String, code_length: usize) -> Self {
        Self {
            store,
            base_url: base_url.trim_end_matches('/').to_string(),
            code_length,
        }
    }

    /// Create a link with a freshly generated short code, retrying on
    /// code collision up to [`MAX_CODE_ATTEMPTS`] times.
    pub async fn create_link(&self, request: CreateLinkRequest) -> Result<Link> {
        let kind = LinkKind::normalize(&request.kind);
        self.validate(&request, &kind)?;

        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let now = Utc::now();
            let link = Link {
                id: Uuid::new_v4().to_string(),
                owner_id: request.owner_id.clone(),
                project_id: request.project_id.clone(),
                name: name.clone(),
                kind: kind.clone(),
                short_code: generate_code(self.code_length),
                destination: request.destination.clone(),
                style: request.style.clone(),
                is_active: true,
                created_at: now,
                updated_at: now,
            };

            match self.store.insert(&link).await {
                Ok(()) => {
                    info!(
                        "Created {} link {} with code {}",
                        link.kind.as_str(),
                        link.id,
                        link.short_code
                    );
                    return Ok(link);
                }
                Err(QrLinkError::DuplicateCode(code)) => {
                    warn!(
                        "Short code {} collided (attempt {}/{}), regenerating",
                        code, attempt, MAX_CODE_ATTEMPTS
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(QrLinkError::retries_exhausted(format!(
            "Gave up after {} short code collisions",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// The string a QR image encodes for this link: the short URL for
    /// dynamic links (so the destination stays editable), the payload
    /// itself for static ones.
    pub fn scan_content(&self, link: &Link) -> String {
        if link.kind.is_dynamic() {
            format!("{}/r/{}", self.base_url, link.short_code)
        } else {
            link.destination.clone()
        }
    }

    fn validate(&self, request: &CreateLinkRequest, kind: &LinkKind) -> Result<()> {
        if request.owner_id.trim().is_empty() {
            return Err(QrLinkError::validation("Owner id is required"));
        }
        if request.destination.trim().is_empty() {
            return Err(QrLinkError::validation("Destination is required"));
        }
        if kind.is_dynamic() && Url::parse(&request.destination).is_err() {
            return Err(QrLinkError::validation(format!(
                "Destination is not a valid URL: {}",
                request.destination
            )));
        }
        if let Some(style) = &request.style {
            if !style.is_object() {
                return Err(QrLinkError::validation("Style must be a JSON object"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Fails the first `collisions` inserts with a duplicate-code error,
    /// then accepts.
    struct CollidingStore {
        collisions: u32,
        attempts: AtomicU32,
        inserted: Mutex<Vec<Link>>,
    }

    impl CollidingStore {
        fn new(collisions: u32) -> Self {
            Self {
                collisions,
                attempts: AtomicU32::new(0),
                inserted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LinkStore for CollidingStore {
        async fn insert(&self, link: &Link) -> Result<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.collisions {
                return Err(QrLinkError::duplicate_code(&link.short_code));
            }
            self.inserted.lock().unwrap().push(link.clone());
            Ok(())
        }

        async fn get_by_code(&self, _code: &str) -> Result<Option<Link>> {
            Ok(None)
        }

        async fn get_for_owner(&self, _id: &str, _owner_id: &str) -> Result<Option<Link>> {
            Ok(None)
        }

        async fn set_active(&self, _code: &str, _active: bool) -> Result<()> {
            Ok(())
        }
    }

    fn request(kind: &str, destination: &str) -> CreateLinkRequest {
        CreateLinkRequest {
            owner_id: "owner-1".to_string(),
            project_id: None,
            name: None,
            kind: kind.to_string(),
            destination: destination.to_string(),
            style: None,
        }
    }

    fn service(store: Arc<CollidingStore>) -> LinkService {
        LinkService::new(store, "http://localhost:8080/".to_string(), 6)
    }

    #[tokio::test]
    async fn creates_dynamic_link_with_defaults() {
        let store = Arc::new(CollidingStore::new(0));
        let svc = service(store.clone());

        let link = svc
            .create_link(request("dynamic", "https://example.com/page"))
            .await
            .unwrap();

        assert!(link.kind.is_dynamic());
        assert_eq!(link.name, "My QR Code");
        assert_eq!(link.short_code.len(), 6);
        assert!(link.is_active);
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn legacy_url_kind_is_normalized_to_dynamic() {
        let store = Arc::new(CollidingStore::new(0));
        let svc = service(store);

        let link = svc
            .create_link(request("url", "https://example.com/"))
            .await
            .unwrap();

        assert_eq!(link.kind, LinkKind::Dynamic);
    }

    #[tokio::test]
    async fn collision_triggers_regeneration_with_fresh_code() {
        let store = Arc::new(CollidingStore::new(1));
        let svc = service(store.clone());

        let link = svc
            .create_link(request("dynamic", "https://example.com/"))
            .await
            .unwrap();

        // First attempt collided, second landed
        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(store.inserted.lock().unwrap()[0].short_code, link.short_code);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_error() {
        let store = Arc::new(CollidingStore::new(u32::MAX));
        let svc = service(store.clone());

        let err = svc
            .create_link(request("dynamic", "https://example.com/"))
            .await
            .unwrap_err();

        assert!(matches!(err, QrLinkError::RetriesExhausted(_)));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn dynamic_destination_must_be_a_url() {
        let svc = service(Arc::new(CollidingStore::new(0)));

        let err = svc
            .create_link(request("dynamic", "not a url"))
            .await
            .unwrap_err();

        assert!(matches!(err, QrLinkError::Validation(_)));
    }

    #[tokio::test]
    async fn static_destination_may_be_arbitrary_text() {
        let svc = service(Arc::new(CollidingStore::new(0)));

        let link = svc
            .create_link(request("wifi", "WIFI:T:WPA;S:guest;P:secret;;"))
            .await
            .unwrap();

        assert!(!link.kind.is_dynamic());
    }

    #[tokio::test]
    async fn style_must_be_a_json_object() {
        let svc = service(Arc::new(CollidingStore::new(0)));

        let mut req = request("dynamic", "https://example.com/");
        req.style = Some(json!(["not", "an", "object"]));
        let err = svc.create_link(req).await.unwrap_err();
        assert!(matches!(err, QrLinkError::Validation(_)));

        let mut req = request("dynamic", "https://example.com/");
        req.style = Some(json!({"fg": "#000000", "bg": "#ffffff"}));
        assert!(svc.create_link(req).await.is_ok());
    }

    #[tokio::test]
    async fn scan_content_uses_short_url_only_for_dynamic() {
        let store = Arc::new(CollidingStore::new(0));
        let svc = service(store);

        let dynamic = svc
            .create_link(request("dynamic", "https://example.com/"))
            .await
            .unwrap();
        assert_eq!(
            svc.scan_content(&dynamic),
            format!("http://localhost:8080/r/{}", dynamic.short_code)
        );

        let stat = svc
            .create_link(request("text", "hello world"))
            .await
            .unwrap();
        assert_eq!(svc.scan_content(&stat), "hello world");
    }
}
