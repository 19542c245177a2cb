//! Partial document updates expressed as field-path sets.
//!
//! Paths use dots between fields and `name[_key=="k"]` to address an array
//! element by its key, e.g. `gallery[_key=="a1"].alt` or `seo.seoTitle`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ids::DocumentId;

/// A partial update of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Patch {
    /// Published document id.
    pub id: String,
    /// Values written only where the path is absent.
    #[serde(rename = "setIfMissing", skip_serializing_if = "Map::is_empty")]
    pub set_if_missing: Map<String, Value>,
    /// Values written unconditionally.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub set: Map<String, Value>,
}

impl Patch {
    /// Start an empty patch for `id`.
    #[must_use]
    pub fn new(id: &DocumentId) -> Self {
        Self {
            id: id.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Add a `setIfMissing` operation.
    #[must_use]
    pub fn set_if_missing(mut self, path: impl Into<String>, value: Value) -> Self {
        self.set_if_missing.insert(path.into(), value);
        self
    }

    /// Add a `set` operation.
    #[must_use]
    pub fn set(mut self, path: impl Into<String>, value: Value) -> Self {
        self.set.insert(path.into(), value);
        self
    }

    /// True when the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.set_if_missing.is_empty()
    }

    /// Apply the patch to a document value in place.
    ///
    /// `setIfMissing` runs before `set`. Keyed segments that match no array
    /// element are skipped.
    pub fn apply_to(&self, doc: &mut Value) {
        for (path, value) in &self.set_if_missing {
            apply_path(doc, path, value.clone(), true);
        }
        for (path, value) in &self.set {
            apply_path(doc, path, value.clone(), false);
        }
    }
}

/// Outcome of a committed patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    /// Store transaction id, when reported.
    pub transaction_id: Option<String>,
    /// Id of the patched document.
    pub document_id: String,
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object field.
    Field(String),
    /// Array element selected by `_key`.
    Keyed {
        /// Array field name.
        field: String,
        /// Element key.
        key: String,
    },
}

/// Split a field path into segments.
#[must_use]
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut raw = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    let mut in_quotes = false;

    for ch in path.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '[' if !in_quotes => {
                depth += 1;
                current.push(ch);
            }
            ']' if !in_quotes => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            '.' if depth == 0 && !in_quotes => raw.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    raw.push(current);

    raw.into_iter()
        .filter(|s| !s.is_empty())
        .map(|s| parse_segment(&s))
        .collect()
}

/// Build a keyed path segment, e.g. `body[_key=="k1"]`.
#[must_use]
pub fn keyed(field: &str, key: &str) -> String {
    format!("{field}[_key==\"{key}\"]")
}

fn parse_segment(segment: &str) -> PathSegment {
    if let Some((field, rest)) = segment.split_once("[_key==\"") {
        if let Some(key) = rest.strip_suffix("\"]") {
            return PathSegment::Keyed {
                field: field.to_string(),
                key: key.to_string(),
            };
        }
    }
    PathSegment::Field(segment.to_string())
}

/// Write `value` at `path`. Returns whether anything changed.
pub fn apply_path(doc: &mut Value, path: &str, value: Value, only_if_missing: bool) -> bool {
    let segments = parse_path(path);
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut cursor = doc;
    for segment in parents {
        cursor = match descend(cursor, segment) {
            Some(next) => next,
            None => return false,
        };
    }

    match last {
        PathSegment::Field(name) => {
            let Some(obj) = ensure_object(cursor) else {
                return false;
            };
            if only_if_missing && obj.get(name).is_some_and(|v| !v.is_null()) {
                return false;
            }
            obj.insert(name.clone(), value);
            true
        }
        PathSegment::Keyed { field, key } => match find_keyed(cursor, field, key) {
            Some(slot) => {
                if !only_if_missing {
                    *slot = value;
                }
                !only_if_missing
            }
            None => false,
        },
    }
}

fn descend<'a>(cursor: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match segment {
        PathSegment::Field(name) => {
            let obj = ensure_object(cursor)?;
            let slot = obj
                .entry(name.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            Some(slot)
        }
        PathSegment::Keyed { field, key } => find_keyed(cursor, field, key),
    }
}

fn find_keyed<'a>(cursor: &'a mut Value, field: &str, key: &str) -> Option<&'a mut Value> {
    cursor
        .get_mut(field)?
        .as_array_mut()?
        .iter_mut()
        .find(|item| item.get("_key").and_then(Value::as_str) == Some(key))
}

fn ensure_object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_path_segments() {
        assert_eq!(
            parse_path("gallery[_key==\"a.1\"].alt"),
            vec![
                PathSegment::Keyed { field: "gallery".to_string(), key: "a.1".to_string() },
                PathSegment::Field("alt".to_string()),
            ]
        );
        assert_eq!(
            parse_path("seo.seoTitle"),
            vec![PathSegment::Field("seo".to_string()), PathSegment::Field("seoTitle".to_string())]
        );
    }

    #[test]
    fn test_apply_nested_creates_objects() {
        let mut doc = json!({"_id": "p1"});
        assert!(apply_path(&mut doc, "seo.seoTitle", json!("Title"), false));
        assert_eq!(doc["seo"]["seoTitle"], "Title");
    }

    #[test]
    fn test_set_if_missing_keeps_existing() {
        let mut doc = json!({"seo": {"_type": "seo", "seoTitle": "Old"}});
        assert!(!apply_path(&mut doc, "seo", json!({"_type": "seo"}), true));
        assert_eq!(doc["seo"]["seoTitle"], "Old");
    }

    #[test]
    fn test_keyed_segment_updates_matching_item_only() {
        let mut doc = json!({"gallery": [{"_key": "a"}, {"_key": "b"}]});
        assert!(apply_path(&mut doc, &format!("{}.alt", keyed("gallery", "b")), json!("Alt B"), false));
        assert!(!apply_path(&mut doc, &format!("{}.alt", keyed("gallery", "zz")), json!("nope"), false));
        assert_eq!(doc["gallery"][1]["alt"], "Alt B");
        assert!(doc["gallery"][0].get("alt").is_none());
    }

    #[test]
    fn test_patch_serializes_sanity_shape() {
        let id = DocumentId::parse("drafts.p1").unwrap();
        let patch = Patch::new(&id)
            .set_if_missing("seo", json!({"_type": "seo"}))
            .set("seo.seoDescription", json!("desc"));
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value["id"], "p1");
        assert_eq!(value["setIfMissing"]["seo"]["_type"], "seo");
        assert_eq!(value["set"]["seo.seoDescription"], "desc");

        let bare = serde_json::to_value(Patch::new(&id)).unwrap();
        assert!(bare.get("set").is_none());
    }

    #[test]
    fn test_patch_apply_order() {
        let id = DocumentId::parse("p1").unwrap();
        let mut doc = json!({"_id": "p1"});
        Patch::new(&id)
            .set_if_missing("seo", json!({"_type": "seo"}))
            .set("seo.seoTitle", json!("New"))
            .apply_to(&mut doc);
        assert_eq!(doc["seo"], json!({"_type": "seo", "seoTitle": "New"}));
    }
}
