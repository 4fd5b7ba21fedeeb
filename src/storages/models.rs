use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Link kind after normalization. Only dynamic links route scans
/// through the redirect pipeline; static kinds keep their literal type
/// tag and are never tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    Dynamic,
    Static(String),
}

impl LinkKind {
    /// Normalize a client-supplied kind. "url" is an alias clients send
    /// for a tracked redirect link and is stored as "dynamic".
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "url" | "dynamic" => LinkKind::Dynamic,
            other => LinkKind::Static(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LinkKind::Dynamic => "dynamic",
            LinkKind::Static(tag) => tag,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, LinkKind::Dynamic)
    }
}

/// A short link row. `short_code` is globally unique, never reused and
/// immutable once assigned; only `is_active` is toggled after creation,
/// and that from outside this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub owner_id: String,
    pub project_id: Option<String>,
    pub name: String,
    #[serde(with = "kind_as_str")]
    pub kind: LinkKind,
    pub short_code: String,
    pub destination: String,
    /// Opaque renderer style blob; stored and returned verbatim
    pub style: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

mod kind_as_str {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::LinkKind;

    pub fn serialize<S: Serializer>(kind: &LinkKind, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(kind.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<LinkKind, D::Error> {
        let raw = String::deserialize(de)?;
        Ok(LinkKind::normalize(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_kind_normalizes_to_dynamic() {
        assert_eq!(LinkKind::normalize("url"), LinkKind::Dynamic);
        assert_eq!(LinkKind::normalize("dynamic"), LinkKind::Dynamic);
    }

    #[test]
    fn other_kinds_stay_literal_and_static() {
        let kind = LinkKind::normalize("wifi");
        assert_eq!(kind.as_str(), "wifi");
        assert!(!kind.is_dynamic());
    }
}
