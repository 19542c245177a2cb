//! Output shapes requested from the generation provider.
//!
//! Each [`OutputKind`] carries a JSON schema sent as the provider's `format`
//! constraint. Replies are parsed into [`GeneratedOutput`] and rejected if a
//! required string or list is empty.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::llm::GenerationError;

/// Requested output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// `{titles: [string]}`
    Titles,
    /// `{short_description, meta_description}`
    Short,
    /// `{image: {alt, filename}}`
    ImageAlt,
    /// `{gallery_alts: [string]}`
    GalleryAlts,
    /// `{faq: [{question, answer}]}`
    Faq,
    /// `{toc: [{text, anchor}]}`
    Toc,
}

impl OutputKind {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Titles => "titles",
            Self::Short => "short",
            Self::ImageAlt => "image_alt",
            Self::GalleryAlts => "gallery_alts",
            Self::Faq => "faq",
            Self::Toc => "toc",
        }
    }

    /// JSON schema for this shape. `max_items` caps list-shaped outputs.
    #[must_use]
    pub fn json_schema(self, max_items: Option<usize>) -> Value {
        let list = |items: Value| {
            let mut schema = json!({"type": "array", "items": items});
            if let Some(max) = max_items {
                schema["maxItems"] = json!(max);
            }
            schema
        };
        let string = json!({"type": "string"});

        let (properties, required) = match self {
            Self::Titles => (json!({"titles": list(string)}), json!(["titles"])),
            Self::Short => (
                json!({
                    "short_description": {"type": "string", "maxLength": 160},
                    "meta_description": {"type": "string", "minLength": 140, "maxLength": 160},
                }),
                json!(["short_description", "meta_description"]),
            ),
            Self::ImageAlt => (
                json!({
                    "image": {
                        "type": "object",
                        "properties": {
                            "alt": {"type": "string", "minLength": 6, "maxLength": 120},
                            "filename": {"type": ["string", "null"]},
                        },
                        "required": ["alt", "filename"],
                        "additionalProperties": false,
                    }
                }),
                json!(["image"]),
            ),
            Self::GalleryAlts => (
                json!({"gallery_alts": list(json!({"type": "string", "minLength": 6, "maxLength": 120}))}),
                json!(["gallery_alts"]),
            ),
            Self::Faq => (
                json!({"faq": list(object_of(&["question", "answer"]))}),
                json!(["faq"]),
            ),
            Self::Toc => (
                json!({"toc": list(object_of(&["text", "anchor"]))}),
                json!(["toc"]),
            ),
        };

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

fn object_of(fields: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| ((*f).to_string(), json!({"type": "string"})))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": fields,
        "additionalProperties": false,
    })
}

/// Suggested titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitlesOutput {
    /// Candidate titles, best first.
    pub titles: Vec<String>,
}

/// Short and meta descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortOutput {
    /// Product short description.
    pub short_description: String,
    /// SEO meta description.
    pub meta_description: String,
}

/// Main image suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSuggestion {
    /// Alt text.
    pub alt: String,
    /// Suggested file name.
    pub filename: Option<String>,
}

/// Main image output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAltOutput {
    /// The suggestion.
    pub image: ImageSuggestion,
}

/// One alt per gallery image, in gallery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryAltsOutput {
    /// Alt texts.
    pub gallery_alts: Vec<String>,
}

/// A question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
}

/// Generated FAQ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqOutput {
    /// Entries.
    pub faq: Vec<FaqEntry>,
}

/// A table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Visible heading text.
    pub text: String,
    /// Anchor id.
    pub anchor: String,
}

/// Generated table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocOutput {
    /// Entries.
    pub toc: Vec<TocEntry>,
}

/// Validated provider output.
///
/// Serializes as the bare payload, which is the shape stored under
/// `aiPreview.result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GeneratedOutput {
    /// Titles.
    Titles(TitlesOutput),
    /// Short and meta descriptions.
    Short(ShortOutput),
    /// Main image alt.
    ImageAlt(ImageAltOutput),
    /// Gallery alts.
    GalleryAlts(GalleryAltsOutput),
    /// FAQ.
    Faq(FaqOutput),
    /// Table of contents.
    Toc(TocOutput),
}

impl GeneratedOutput {
    /// Shape of this output.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        match self {
            Self::Titles(_) => OutputKind::Titles,
            Self::Short(_) => OutputKind::Short,
            Self::ImageAlt(_) => OutputKind::ImageAlt,
            Self::GalleryAlts(_) => OutputKind::GalleryAlts,
            Self::Faq(_) => OutputKind::Faq,
            Self::Toc(_) => OutputKind::Toc,
        }
    }

    /// Parse provider text as `kind` and validate it.
    ///
    /// Surrounding code fences are tolerated.
    ///
    /// # Errors
    /// Returns an error if the text is not JSON of the requested shape or a
    /// required field is empty.
    pub fn parse(kind: OutputKind, text: &str) -> Result<Self, GenerationError> {
        let json = strip_code_fence(text);
        let output = match kind {
            OutputKind::Titles => Self::Titles(serde_json::from_str(json)?),
            OutputKind::Short => Self::Short(serde_json::from_str(json)?),
            OutputKind::ImageAlt => Self::ImageAlt(serde_json::from_str(json)?),
            OutputKind::GalleryAlts => Self::GalleryAlts(serde_json::from_str(json)?),
            OutputKind::Faq => Self::Faq(serde_json::from_str(json)?),
            OutputKind::Toc => Self::Toc(serde_json::from_str(json)?),
        };
        output.validate()?;
        Ok(output)
    }

    /// Reject outputs whose required strings or lists are empty.
    ///
    /// # Errors
    /// Returns [`GenerationError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), GenerationError> {
        fn blank(s: &str) -> bool {
            s.trim().is_empty()
        }
        fn invalid(field: &str) -> Result<(), GenerationError> {
            Err(GenerationError::Invalid(format!("{field} is empty")))
        }

        match self {
            Self::Titles(o) if o.titles.iter().all(|t| blank(t)) => invalid("titles"),
            Self::Short(o) if blank(&o.short_description) => invalid("short_description"),
            Self::Short(o) if blank(&o.meta_description) => invalid("meta_description"),
            Self::ImageAlt(o) if blank(&o.image.alt) => invalid("image.alt"),
            Self::GalleryAlts(o) if o.gallery_alts.is_empty() => invalid("gallery_alts"),
            Self::Faq(o) if o.faq.is_empty() => invalid("faq"),
            Self::Toc(o) if o.toc.is_empty() => invalid("toc"),
            _ => Ok(()),
        }
    }

    /// JSON value of the payload.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_titles() {
        let out = GeneratedOutput::parse(OutputKind::Titles, r#"{"titles": ["A", "B"]}"#).unwrap();
        assert_eq!(
            out,
            GeneratedOutput::Titles(TitlesOutput { titles: vec!["A".into(), "B".into()] })
        );
        assert_eq!(out.to_value(), json!({"titles": ["A", "B"]}));
    }

    #[test]
    fn test_parse_tolerates_code_fence() {
        let text = "```json\n{\"toc\": [{\"text\": \"Intro\", \"anchor\": \"intro\"}]}\n```";
        let out = GeneratedOutput::parse(OutputKind::Toc, text).unwrap();
        assert_eq!(out.kind(), OutputKind::Toc);
    }

    #[test]
    fn test_parse_rejects_empty_fields() {
        assert!(matches!(
            GeneratedOutput::parse(OutputKind::Titles, r#"{"titles": [" "]}"#),
            Err(GenerationError::Invalid(_))
        ));
        assert!(matches!(
            GeneratedOutput::parse(
                OutputKind::Short,
                r#"{"short_description": "ok", "meta_description": ""}"#
            ),
            Err(GenerationError::Invalid(_))
        ));
        assert!(matches!(
            GeneratedOutput::parse(OutputKind::Faq, "not json"),
            Err(GenerationError::JsonParse(_))
        ));
    }

    #[test]
    fn test_schema_caps_lists() {
        let schema = OutputKind::Titles.json_schema(Some(3));
        assert_eq!(schema["properties"]["titles"]["maxItems"], 3);
        assert_eq!(schema["required"], json!(["titles"]));

        let faq = OutputKind::Faq.json_schema(None);
        assert_eq!(faq["properties"]["faq"]["items"]["required"], json!(["question", "answer"]));
        assert!(faq["properties"]["faq"].get("maxItems").is_none());
    }
}
