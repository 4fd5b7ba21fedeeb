//! HTTP surface
//!
//! Two route families with different trust levels: `/r/{code}` is
//! public and rate limited, `/api/analytics` requires a verified owner
//! identity supplied by the edge proxy.

pub mod middleware;
pub mod services;

use serde::Serialize;

/// JSON error envelope shared by every handler and middleware.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
