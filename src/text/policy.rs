//! Per-field clamp policies with the defaults used by the apply routes.

use serde::{Deserialize, Serialize};

use super::normalize::{
    SENTENCE_BOUNDARY_FLOOR, WORD_BOUNDARY_FLOOR, char_len, clamp_by_characters,
    clamp_by_sentence_boundary, clamp_by_words_then_characters, clamp_with_ellipsis,
    strip_markup_and_controls,
};

/// Truncation strategy for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// Cut at the last space past the floor, else hard-cut.
    WordBoundary,
    /// Prefer a sentence end past the floor, then a space, then hard-cut.
    SentenceBoundary,
    /// Hard cut with a trailing ellipsis.
    Ellipsis,
}

/// Length policy for one field kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicy {
    /// Maximum characters.
    pub max_chars: usize,
    /// Optional word cap, applied before the character cap.
    pub max_words: Option<usize>,
    /// Minimum offset for a boundary cut.
    pub min_boundary: usize,
    /// How over-length values are cut.
    pub truncation: Truncation,
}

impl FieldPolicy {
    /// Word-boundary policy.
    #[must_use]
    pub const fn word_boundary(max_chars: usize, min_boundary: usize) -> Self {
        Self {
            max_chars,
            max_words: None,
            min_boundary,
            truncation: Truncation::WordBoundary,
        }
    }

    /// Sentence-aware policy.
    #[must_use]
    pub const fn sentence_boundary(max_chars: usize, min_boundary: usize) -> Self {
        Self {
            max_chars,
            max_words: None,
            min_boundary,
            truncation: Truncation::SentenceBoundary,
        }
    }

    /// Hard cut plus ellipsis.
    #[must_use]
    pub const fn ellipsis(max_chars: usize) -> Self {
        Self {
            max_chars,
            max_words: None,
            min_boundary: 0,
            truncation: Truncation::Ellipsis,
        }
    }

    /// Add a word cap.
    #[must_use]
    pub const fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = Some(max_words);
        self
    }

    /// Normalize and clamp `input` under this policy.
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        match (self.truncation, self.max_words) {
            (Truncation::WordBoundary, Some(words)) => {
                clamp_by_words_then_characters(input, words, self.max_chars, self.min_boundary)
            }
            (Truncation::WordBoundary, None) => {
                clamp_by_characters(input, self.max_chars, self.min_boundary)
            }
            (Truncation::SentenceBoundary, _) => {
                clamp_by_sentence_boundary(input, self.max_chars, self.min_boundary)
            }
            (Truncation::Ellipsis, _) => clamp_with_ellipsis(input, self.max_chars),
        }
    }
}

/// Policy table for every field the apply routes write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicies {
    /// Document title, mirrored to the SEO title.
    pub title: FieldPolicy,
    /// Image and gallery alt text.
    pub image_alt: FieldPolicy,
    /// Short description.
    pub short_description: FieldPolicy,
    /// Meta description.
    pub meta_description: FieldPolicy,
    /// Below this length the short description replaces the meta text.
    pub meta_min_chars: usize,
    /// FAQ question.
    pub faq_question: FieldPolicy,
    /// FAQ answer.
    pub faq_answer: FieldPolicy,
}

impl Default for FieldPolicies {
    fn default() -> Self {
        Self {
            title: FieldPolicy::word_boundary(60, WORD_BOUNDARY_FLOOR),
            image_alt: FieldPolicy::word_boundary(120, WORD_BOUNDARY_FLOOR).with_max_words(16),
            short_description: FieldPolicy::sentence_boundary(160, SENTENCE_BOUNDARY_FLOOR),
            meta_description: FieldPolicy::sentence_boundary(160, SENTENCE_BOUNDARY_FLOOR),
            meta_min_chars: 140,
            faq_question: FieldPolicy::ellipsis(140),
            faq_answer: FieldPolicy::ellipsis(600),
        }
    }
}

impl FieldPolicies {
    /// Normalized meta description, falling back to the short text as the
    /// source when the meta text is too short and the short text is long.
    #[must_use]
    pub fn meta_description(&self, short: &str, meta: &str) -> String {
        let source = meta_description_source(short, meta, self.meta_min_chars);
        self.meta_description.apply(source)
    }
}

/// Pick the source text for the meta description.
#[must_use]
pub fn meta_description_source<'a>(short: &'a str, meta: &'a str, min_meta_chars: usize) -> &'a str {
    let meta_len = char_len(&strip_markup_and_controls(meta));
    let short_len = char_len(&strip_markup_and_controls(short));
    if meta_len < min_meta_chars && short_len >= min_meta_chars {
        short
    } else {
        meta
    }
}
