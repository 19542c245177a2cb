//! The preview envelope stored on a document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cms::Patch;
use crate::ids::DocumentId;

/// Document field holding the preview.
pub const PREVIEW_FIELD: &str = "aiPreview";

/// A generated-but-not-applied suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRecord {
    /// Preview kind, e.g. `title_suggest`.
    pub event: String,
    /// Creation time (RFC 3339).
    pub created_at: DateTime<Utc>,
    /// Caller metadata.
    #[serde(default)]
    pub meta: Value,
    /// Document name at generation time.
    #[serde(default)]
    pub name: Option<String>,
    /// Kind-specific payload.
    pub result: Value,
}

impl PreviewRecord {
    /// New record stamped with the current time.
    #[must_use]
    pub fn new(event: impl Into<String>, result: Value) -> Self {
        Self {
            event: event.into(),
            created_at: Utc::now(),
            meta: Value::Null,
            name: None,
            result,
        }
    }

    /// Attach caller metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    /// Attach the document name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Patch replacing the document's preview with this record.
    #[must_use]
    pub fn into_patch(self, id: &DocumentId) -> Patch {
        let value = serde_json::to_value(&self).unwrap_or(Value::Null);
        Patch::new(id).set(PREVIEW_FIELD, value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_record_serializes_envelope() {
        let id = DocumentId::parse("drafts.p1").unwrap();
        let patch = PreviewRecord::new("title_suggest", json!({"titles": ["A"]}))
            .with_name(Some("Wallet".to_string()))
            .into_patch(&id);

        assert_eq!(patch.id, "p1");
        let preview = &patch.set[PREVIEW_FIELD];
        assert_eq!(preview["event"], "title_suggest");
        assert_eq!(preview["name"], "Wallet");
        assert!(preview["meta"].is_null());
        assert_eq!(preview["result"]["titles"][0], "A");
        assert!(preview["createdAt"].as_str().unwrap().contains('T'));
    }
}
