//! Read helpers over loosely-shaped CMS documents.

use serde_json::Value;

/// Value at a dot-separated path, if present.
#[must_use]
pub fn field_at<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .try_fold(doc, |cursor, segment| cursor.get(segment))
}

/// Non-blank string at a dot-separated path.
#[must_use]
pub fn str_at<'a>(doc: &'a Value, path: &str) -> Option<&'a str> {
    field_at(doc, path)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Whether the path holds a non-null value.
#[must_use]
pub fn is_defined(doc: &Value, path: &str) -> bool {
    field_at(doc, path).is_some_and(|v| !v.is_null())
}

/// Array at a dot-separated path, or an empty slice.
#[must_use]
pub fn array_at<'a>(doc: &'a Value, path: &str) -> &'a [Value] {
    field_at(doc, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Document `_type`, if set.
#[must_use]
pub fn doc_type(doc: &Value) -> Option<&str> {
    str_at(doc, "_type")
}

/// Plain text of a portable-text field, limited to the first `max_words`.
///
/// Only `block` nodes contribute; images and custom nodes are skipped.
#[must_use]
pub fn portable_text_words(doc: &Value, field: &str, max_words: usize) -> String {
    let mut words: Vec<&str> = Vec::new();

    for block in array_at(doc, field) {
        if block.get("_type").and_then(Value::as_str) != Some("block") {
            continue;
        }
        for child in array_at(block, "children") {
            let Some(text) = child.get("text").and_then(Value::as_str) else {
                continue;
            };
            for word in text.split_whitespace() {
                if words.len() == max_words {
                    return words.join(" ");
                }
                words.push(word);
            }
        }
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_field_access() {
        let doc = json!({"_type": "product", "image": {"asset": {"_ref": "img-1"}, "alt": " "}});
        assert!(is_defined(&doc, "image.asset"));
        assert!(!is_defined(&doc, "image.caption"));
        assert_eq!(str_at(&doc, "image.alt"), None);
        assert_eq!(doc_type(&doc), Some("product"));
        assert!(array_at(&doc, "gallery").is_empty());
    }

    #[test]
    fn test_portable_text_words() {
        let doc = json!({
            "body": [
                {"_type": "block", "children": [{"text": "First  block text"}, {"text": "continues"}]},
                {"_type": "image", "_key": "i1"},
                {"_type": "block", "children": [{"text": "second block here"}]}
            ]
        });
        assert_eq!(
            portable_text_words(&doc, "body", 200),
            "First block text continues second block here"
        );
        assert_eq!(portable_text_words(&doc, "body", 3), "First block text");
        assert_eq!(portable_text_words(&doc, "missing", 3), "");
    }
}
