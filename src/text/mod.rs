//! Text normalization for CMS-bound values.
//!
//! Everything in this module is pure and synchronous:
//! - markup, control and invisible character stripping
//! - boundary-aware clamps (word, sentence, ellipsis)
//! - order-preserving keyed deduplication
//! - slug generation and validation

pub mod dedupe;
pub mod normalize;
pub mod policy;
pub mod slug;

pub use dedupe::{dedup_key, deduplicate_keyed};
pub use normalize::{
    char_len, clamp_by_characters, clamp_by_sentence_boundary, clamp_by_words_then_characters,
    clamp_with_ellipsis, strip_markup_and_controls,
};
pub use policy::{FieldPolicies, FieldPolicy, Truncation, meta_description_source};
pub use slug::{fallback_slug_base, is_valid_slug, slugify, with_suffix};
