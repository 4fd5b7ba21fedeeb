//! Dashboard query time ranges
//!
//! All aggregation queries run over a half-open `[from, to)` range.
//! Callers omitting both bounds get the last seven days; the all-time
//! dashboard uses a sentinel epoch-to-now range instead of a separate
//! query path.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{QrLinkError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Last seven days, used when the caller supplies neither bound.
    pub fn default_range() -> Self {
        let to = Utc::now();
        Self {
            from: to - Duration::days(7),
            to,
        }
    }

    /// Sentinel wide range for all-time dashboards.
    pub fn all_time() -> Self {
        Self {
            from: DateTime::UNIX_EPOCH,
            to: Utc::now(),
        }
    }

    /// Parse optional `from`/`to` query values. Accepts `YYYY-MM-DD`
    /// (midnight UTC) or RFC3339. A malformed value is an error, never a
    /// silent fallback; a missing bound takes the default for its side.
    pub fn parse_query(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let default = Self::default_range();

        let from = match from {
            Some(s) => parse_date(s)?,
            None => default.from,
        };
        let to = match to {
            Some(s) => parse_date(s)?,
            None => default.to,
        };

        if from > to {
            return Err(QrLinkError::validation(
                "'from' must not be later than 'to'",
            ));
        }

        Ok(Self { from, to })
    }
}

fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            QrLinkError::date_parse(format!(
                "Invalid date '{}': expected YYYY-MM-DD or RFC3339",
                s
            ))
        })
}
