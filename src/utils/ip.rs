//! Client IP extraction
//!
//! The public redirect endpoint sits behind a reverse proxy in every
//! real deployment, so forwarded headers take priority over the peer
//! address. The extracted value feeds rate-limit keys and the
//! unique-visitor approximation; it is a coarse identity, not a
//! verified one.

use actix_web::http::header::HeaderMap;
use actix_web::HttpRequest;

/// Extract the forwarded client IP from `X-Forwarded-For` (first hop)
/// or `X-Real-IP`.
pub fn extract_forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
                .filter(|s| !s.is_empty())
        })
}

/// Best-effort client IP: forwarded headers first, then the peer
/// address, then "unknown" so downstream keys stay non-empty.
pub fn extract_client_ip(req: &HttpRequest) -> String {
    extract_forwarded_ip(req.headers())
        .or_else(|| {
            req.connection_info()
                .peer_addr()
                .map(|addr| addr.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
