//! User-agent classification
//!
//! Pure enrichment of the raw `User-Agent` header into the dimensions
//! the dashboards group by. Total by contract: anything unparseable
//! degrades to Desktop with unknown os/browser instead of erroring, so
//! the scan path never loses an event to a weird header.

use serde::{Deserialize, Serialize};
use woothee::parser::Parser;

/// Classification precedence is Bot > Tablet > Mobile > Desktop: an
/// automated agent that also advertises a mobile signature counts as a
/// bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Tablet,
    Bot,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Desktop => "Desktop",
            DeviceClass::Mobile => "Mobile",
            DeviceClass::Tablet => "Tablet",
            DeviceClass::Bot => "Bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UaProfile {
    pub device_class: DeviceClass,
    pub os_name: Option<String>,
    pub browser_name: Option<String>,
}

impl UaProfile {
    fn unknown_desktop() -> Self {
        Self {
            device_class: DeviceClass::Desktop,
            os_name: None,
            browser_name: None,
        }
    }
}

/// Classify a raw user-agent string. Never fails.
pub fn classify(raw: &str) -> UaProfile {
    if raw.trim().is_empty() {
        return UaProfile::unknown_desktop();
    }

    let parsed = Parser::new().parse(raw);

    let (category, os_name, browser_name) = match &parsed {
        Some(result) => (
            result.category,
            non_unknown(result.os),
            non_unknown(result.name),
        ),
        None => ("unknown", None, None),
    };

    UaProfile {
        device_class: device_class_of(raw, category),
        os_name,
        browser_name,
    }
}

fn non_unknown(value: &str) -> Option<String> {
    if value.is_empty() || value == "UNKNOWN" {
        None
    } else {
        Some(value.to_string())
    }
}

fn device_class_of(raw: &str, category: &str) -> DeviceClass {
    let lowered = raw.to_ascii_lowercase();

    if category == "crawler"
        || lowered.contains("bot")
        || lowered.contains("spider")
        || lowered.contains("crawl")
    {
        return DeviceClass::Bot;
    }

    // woothee folds tablets into "smartphone", so tablet signals come
    // from the raw string and must outrank the mobile category
    if lowered.contains("ipad") || lowered.contains("tablet") {
        return DeviceClass::Tablet;
    }

    if category == "smartphone" || category == "mobilephone" || lowered.contains("mobile") {
        return DeviceClass::Mobile;
    }

    DeviceClass::Desktop
}
