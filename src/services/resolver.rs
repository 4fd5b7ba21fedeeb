//! Scan resolution
//!
//! The public hot path: look the code up, hand telemetry to the
//! recorder, return the destination. The redirect must never wait on
//! the durable write, and a disabled or missing code must leave no
//! trace in the event log.

use std::sync::Arc;

use tracing::debug;

use crate::analytics::ScanCapture;
use crate::errors::{QrLinkError, Result};
use crate::services::recorder::ScanRecorder;
use crate::services::ua_classifier::classify;
use crate::storages::LinkStore;

pub struct Resolver {
    links: Arc<dyn LinkStore>,
    recorder: Arc<dyn ScanRecorder>,
}

impl Resolver {
    pub fn new(links: Arc<dyn LinkStore>, recorder: Arc<dyn ScanRecorder>) -> Self {
        Self { links, recorder }
    }

    /// Resolve a short code to its destination URL, dispatching a scan
    /// event for dynamic links. Missing and disabled codes are
    /// indistinguishable to the caller and record nothing.
    pub async fn resolve(
        &self,
        code: &str,
        client_ip: &str,
        user_agent: &str,
        referrer: Option<&str>,
    ) -> Result<String> {
        let link = self
            .links
            .get_by_code(code)
            .await?
            .filter(|l| l.is_active)
            .ok_or_else(|| QrLinkError::not_found(code))?;

        if link.kind.is_dynamic() {
            let profile = classify(user_agent);
            debug!(
                "Scan on {} from {} ({})",
                code,
                client_ip,
                profile.device_class.as_str()
            );
            self.recorder.dispatch(ScanCapture {
                link_id: link.id.clone(),
                owner_id: link.owner_id.clone(),
                client_ip: client_ip.to_string(),
                // Geo enrichment is not wired up; bucketed as unknown
                country: Some("Unknown".to_string()),
                city: Some("Unknown".to_string()),
                user_agent_raw: (!user_agent.is_empty()).then(|| user_agent.to_string()),
                profile,
                referrer: referrer.filter(|r| !r.is_empty()).map(|r| r.to_string()),
            });
        }

        Ok(link.destination)
    }
}
