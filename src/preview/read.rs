//! Lenient readers over `aiPreview.result`.
//!
//! Previews are written by jobs but live in an external CMS where editors
//! and older workers may have left anything behind, so readers skip entries
//! of the wrong shape instead of failing.

use serde::Serialize;
use serde_json::Value;

use crate::cms::document::{array_at, field_at, str_at};
use crate::llm::FaqEntry;
use crate::preview::PREVIEW_FIELD;

/// An alt suggestion for a keyed array item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyedAlt {
    /// Array item `_key`.
    pub key: String,
    /// Suggested alt text.
    pub alt: String,
}

/// A table-of-contents preview entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocPreviewItem {
    /// Existing `_key`, if the entry carried one.
    #[serde(rename = "_key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Heading text.
    pub text: String,
    /// Anchor id.
    pub anchor: String,
}

/// Article image alt preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAltsPreview {
    /// Featured image alt.
    pub featured: Option<String>,
    /// Body image alts.
    pub body: Vec<KeyedAlt>,
}

impl ImageAltsPreview {
    /// Whether neither part carries anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.featured.is_none() && self.body.is_empty()
    }
}

/// `aiPreview.result.<field>` of a document.
#[must_use]
pub fn result_field<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    field_at(doc, &format!("{PREVIEW_FIELD}.result.{field}"))
}

fn result_str(doc: &Value, path: &str) -> Option<String> {
    str_at(doc, &format!("{PREVIEW_FIELD}.result.{path}")).map(str::to_string)
}

fn result_array<'a>(doc: &'a Value, path: &str) -> &'a [Value] {
    array_at(doc, &format!("{PREVIEW_FIELD}.result.{path}"))
}

fn string_field(item: &Value, field: &str) -> String {
    item.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Suggested titles (strings only).
#[must_use]
pub fn titles(doc: &Value) -> Vec<String> {
    result_array(doc, "titles")
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// `(short_description, meta_description)`, each when non-blank.
#[must_use]
pub fn short_pair(doc: &Value) -> (Option<String>, Option<String>) {
    (
        result_str(doc, "short_description"),
        result_str(doc, "meta_description"),
    )
}

/// `(alt, filename)` of the main image suggestion.
#[must_use]
pub fn image_suggestion(doc: &Value) -> (Option<String>, Option<String>) {
    (result_str(doc, "image.alt"), result_str(doc, "image.filename"))
}

/// Gallery suggestions with both key and alt present.
#[must_use]
pub fn gallery_suggestions(doc: &Value) -> Vec<KeyedAlt> {
    result_array(doc, "gallery")
        .iter()
        .map(|item| KeyedAlt {
            key: string_field(item, "key"),
            alt: string_field(item, "alt"),
        })
        .filter(|s| !s.key.is_empty() && !s.alt.is_empty())
        .collect()
}

/// Table-of-contents entries as stored.
#[must_use]
pub fn toc_entries(doc: &Value) -> Vec<TocPreviewItem> {
    result_array(doc, "toc")
        .iter()
        .filter(|item| item.is_object())
        .map(|item| TocPreviewItem {
            key: item
                .get("_key")
                .and_then(Value::as_str)
                .map(str::to_string),
            text: string_field(item, "text"),
            anchor: string_field(item, "anchor"),
        })
        .collect()
}

/// FAQ entries as stored.
#[must_use]
pub fn faq_entries(doc: &Value) -> Vec<FaqEntry> {
    result_array(doc, "faq")
        .iter()
        .filter(|item| item.is_object())
        .map(|item| FaqEntry {
            question: string_field(item, "question"),
            answer: string_field(item, "answer"),
        })
        .collect()
}

/// Article image alt preview, when one was generated.
#[must_use]
pub fn image_alts(doc: &Value) -> Option<ImageAltsPreview> {
    let node = result_field(doc, "imageAlts").filter(|v| v.is_object())?;

    let featured = node
        .get("featured")
        .and_then(|f| f.get("alt"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let body = array_at(node, "body.items")
        .iter()
        .filter_map(|item| {
            let key = item.get("key").and_then(Value::as_str)?;
            let alt = item.get("alt").and_then(Value::as_str)?;
            Some(KeyedAlt {
                key: key.to_string(),
                alt: alt.to_string(),
            })
        })
        .collect();

    Some(ImageAltsPreview { featured, body })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_readers_skip_malformed_entries() {
        let doc = json!({
            "aiPreview": {
                "result": {
                    "titles": ["One", 2, "Three"],
                    "gallery": [{"key": "a", "alt": "Alt A"}, {"key": "", "alt": "x"}, "junk"],
                    "toc": [{"_key": "t1", "text": "Intro", "anchor": "intro"}, 5],
                    "faq": [{"question": "Q?"}]
                }
            }
        });

        assert_eq!(titles(&doc), vec!["One", "Three"]);
        assert_eq!(gallery_suggestions(&doc), vec![KeyedAlt { key: "a".into(), alt: "Alt A".into() }]);
        assert_eq!(toc_entries(&doc).len(), 1);
        assert_eq!(toc_entries(&doc)[0].key.as_deref(), Some("t1"));
        assert_eq!(faq_entries(&doc)[0].answer, "");
    }

    #[test]
    fn test_missing_preview_reads_empty() {
        let doc = json!({"_id": "p1"});
        assert!(titles(&doc).is_empty());
        assert_eq!(short_pair(&doc), (None, None));
        assert_eq!(image_suggestion(&doc), (None, None));
        assert!(image_alts(&doc).is_none());
    }

    #[test]
    fn test_image_alts() {
        let doc = json!({
            "aiPreview": {"result": {"imageAlts": {
                "featured": {"alt": "Cover"},
                "body": {"items": [{"key": "b1", "alt": "One"}, {"key": "b2"}]}
            }}}
        });
        let preview = image_alts(&doc).unwrap();
        assert_eq!(preview.featured.as_deref(), Some("Cover"));
        assert_eq!(preview.body.len(), 1);
        assert!(!preview.is_empty());
    }
}
