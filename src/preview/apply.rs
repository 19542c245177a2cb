//! Turn a stored preview into a partial patch of the real fields.
//!
//! Planners are pure: they read the fetched document, normalize the preview
//! values with the configured [`FieldPolicies`] and return the patch plus a
//! response summary. Committing is left to the caller.

use serde_json::{Value, json};

use crate::cms::document::{array_at, doc_type, is_defined};
use crate::cms::{Patch, keyed};
use crate::error::{WorkerError, WorkerResult};
use crate::ids::{DocumentId, KeyGenerator};
use crate::llm::FaqEntry;
use crate::preview::read::{self, KeyedAlt};
use crate::text::{FieldPolicies, dedup_key, deduplicate_keyed, strip_markup_and_controls};

/// A planned write and the summary reported back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyPlan {
    /// Patch to commit. May be empty when there is nothing to write.
    pub patch: Patch,
    /// Fields merged into the response body.
    pub summary: Value,
}

impl ApplyPlan {
    fn new(patch: Patch, summary: Value) -> Self {
        Self { patch, summary }
    }
}

fn seo_object() -> Value {
    json!({"_type": "seo"})
}

/// Apply the title at `index` (clamped to range).
///
/// Articles receive `title`; everything else receives `name`. The value is
/// mirrored to `seo.seoTitle`.
///
/// # Errors
/// [`WorkerError::NoPreview`] without titles, [`WorkerError::NothingToApply`]
/// when the chosen title normalizes to nothing.
pub fn plan_title(
    id: &DocumentId,
    doc: &Value,
    index: i64,
    policies: &FieldPolicies,
) -> WorkerResult<ApplyPlan> {
    let titles = read::titles(doc);
    if titles.is_empty() {
        return Err(WorkerError::NoPreview(
            "No AI titles found on aiPreview".to_string(),
        ));
    }

    let last = titles.len() - 1;
    let chosen = usize::try_from(index.max(0)).map_or(last, |i| i.min(last));
    let title = policies.title.apply(&titles[chosen]);
    if title.is_empty() {
        return Err(WorkerError::NothingToApply(
            "Selected title is empty after normalization".to_string(),
        ));
    }

    let field = if doc_type(doc) == Some("article") {
        "title"
    } else {
        "name"
    };

    let patch = Patch::new(id)
        .set_if_missing("seo", seo_object())
        .set(field, json!(title))
        .set("seo.seoTitle", json!(title));

    Ok(ApplyPlan::new(
        patch,
        json!({"appliedIndex": chosen, "title": title, "field": field}),
    ))
}

/// Apply the short and meta descriptions.
///
/// # Errors
/// [`WorkerError::NoPreview`] unless both texts are present.
pub fn plan_short(id: &DocumentId, doc: &Value, policies: &FieldPolicies) -> WorkerResult<ApplyPlan> {
    let (Some(short), Some(meta)) = read::short_pair(doc) else {
        return Err(WorkerError::NoPreview(
            "No short/meta in aiPreview. Run short_generate first.".to_string(),
        ));
    };

    let short_normalized = policies.short_description.apply(&short);
    let meta_normalized = policies.meta_description(&short, &meta);

    let patch = Patch::new(id)
        .set_if_missing("seo", seo_object())
        .set("shortDescription", json!(short_normalized))
        .set("seo.seoDescription", json!(meta_normalized));

    Ok(ApplyPlan::new(
        patch,
        json!({"applied": {
            "shortDescription": short_normalized,
            "seoDescription": meta_normalized,
        }}),
    ))
}

/// Apply the main image alt of a product.
///
/// # Errors
/// [`WorkerError::BadRequest`] without a main image, [`WorkerError::NoPreview`]
/// without an alt, [`WorkerError::NothingToApply`] when it normalizes away.
pub fn plan_image_alt(
    id: &DocumentId,
    doc: &Value,
    policies: &FieldPolicies,
) -> WorkerResult<ApplyPlan> {
    if !is_defined(doc, "image.asset") {
        return Err(WorkerError::BadRequest(
            "No main image to apply ALT".to_string(),
        ));
    }

    let (Some(alt), _) = read::image_suggestion(doc) else {
        return Err(WorkerError::NoPreview(
            "No ALT found in aiPreview. Run image_alt_rename first.".to_string(),
        ));
    };

    let alt = policies.image_alt.apply(&alt);
    if alt.is_empty() {
        return Err(WorkerError::NothingToApply(
            "ALT is empty after normalization".to_string(),
        ));
    }

    Ok(ApplyPlan::new(
        Patch::new(id).set("image.alt", json!(alt)),
        json!({"applied": {"alt": alt}}),
    ))
}

fn normalize_keyed_alts(items: Vec<KeyedAlt>, policies: &FieldPolicies) -> Vec<KeyedAlt> {
    deduplicate_keyed(
        items.into_iter().map(|item| KeyedAlt {
            key: item.key.trim().to_string(),
            alt: policies.image_alt.apply(&item.alt),
        }),
        |item| dedup_key(&item.key),
        |item| !item.key.is_empty() && !item.alt.is_empty(),
    )
}

/// Apply gallery alts to the gallery items that still exist.
///
/// # Errors
/// [`WorkerError::NoPreview`] without suggestions,
/// [`WorkerError::NothingToApply`] when no suggestion matches a gallery key.
pub fn plan_gallery_alts(
    id: &DocumentId,
    doc: &Value,
    policies: &FieldPolicies,
) -> WorkerResult<ApplyPlan> {
    let suggestions = read::gallery_suggestions(doc);
    if suggestions.is_empty() {
        return Err(WorkerError::NoPreview(
            "No gallery suggestions in aiPreview. Run gallery_alt_generate first.".to_string(),
        ));
    }

    let suggestions = normalize_keyed_alts(suggestions, policies);
    let mut patch = Patch::new(id);
    let mut applied = 0_usize;

    for item in array_at(doc, "gallery") {
        let Some(key) = item.get("_key").and_then(Value::as_str) else {
            continue;
        };
        if let Some(s) = suggestions.iter().find(|s| s.key == key) {
            patch = patch.set(format!("{}.alt", keyed("gallery", key)), json!(s.alt));
            applied += 1;
        }
    }

    if applied == 0 {
        return Err(WorkerError::NothingToApply(
            "No matching gallery items to apply.".to_string(),
        ));
    }

    Ok(ApplyPlan::new(patch, json!({"appliedCount": applied})))
}

/// Replace `toc` with the previewed entries.
///
/// # Errors
/// [`WorkerError::NoPreview`] when no usable entry remains.
pub fn plan_toc(id: &DocumentId, doc: &Value, keys: &dyn KeyGenerator) -> WorkerResult<ApplyPlan> {
    let entries = deduplicate_keyed(
        read::toc_entries(doc).into_iter().map(|mut e| {
            e.text = strip_markup_and_controls(&e.text);
            e.anchor = e.anchor.trim().to_string();
            e
        }),
        |e| dedup_key(&e.anchor),
        |e| !e.text.is_empty() && !e.anchor.is_empty(),
    );

    if entries.is_empty() {
        return Err(WorkerError::NoPreview("No TOC in aiPreview".to_string()));
    }

    let toc: Vec<Value> = entries
        .into_iter()
        .map(|e| {
            json!({
                "_key": e.key.unwrap_or_else(|| keys.next_key()),
                "_type": "tocItem",
                "label": e.text,
                "anchorId": e.anchor,
            })
        })
        .collect();
    let count = toc.len();

    Ok(ApplyPlan::new(
        Patch::new(id).set("toc", Value::Array(toc)),
        json!({"count": count}),
    ))
}

/// Normalize FAQ entries with the FAQ policies; first question wins.
#[must_use]
pub fn normalize_faq(items: Vec<FaqEntry>, policies: &FieldPolicies) -> Vec<FaqEntry> {
    deduplicate_keyed(
        items.into_iter().map(|e| FaqEntry {
            question: policies.faq_question.apply(&e.question),
            answer: policies.faq_answer.apply(&e.answer),
        }),
        |e| dedup_key(&e.question),
        |e| !e.question.is_empty() && !e.answer.is_empty(),
    )
}

/// Replace `faq` with the previewed entries.
///
/// Returns an empty patch when nothing survives normalization.
#[must_use]
pub fn plan_faq(
    id: &DocumentId,
    doc: &Value,
    policies: &FieldPolicies,
    keys: &dyn KeyGenerator,
) -> ApplyPlan {
    let items = normalize_faq(read::faq_entries(doc), policies);
    let applied = items.len();

    if items.is_empty() {
        return ApplyPlan::new(Patch::new(id), json!({"applied": 0}));
    }

    let faq: Vec<Value> = items
        .into_iter()
        .map(|e| {
            json!({
                "_key": keys.next_key(),
                "_type": "faqItem",
                "question": e.question,
                "answer": e.answer,
            })
        })
        .collect();

    ApplyPlan::new(
        Patch::new(id).set("faq", Value::Array(faq)),
        json!({"applied": applied}),
    )
}

/// Apply featured and body image alts of an article.
///
/// # Errors
/// [`WorkerError::NoPreview`] without a preview,
/// [`WorkerError::NothingToApply`] when every alt normalizes away.
pub fn plan_article_image_alt(
    id: &DocumentId,
    doc: &Value,
    policies: &FieldPolicies,
) -> WorkerResult<ApplyPlan> {
    let preview = read::image_alts(doc)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| WorkerError::NoPreview("No preview ALT found. Generate first.".to_string()))?;

    let featured = preview
        .featured
        .as_deref()
        .map(|alt| policies.image_alt.apply(alt))
        .filter(|alt| !alt.is_empty());
    let body = normalize_keyed_alts(preview.body, policies);

    let mut patch = Patch::new(id);
    if let Some(alt) = &featured {
        patch = patch.set("featuredImage.alt", json!(alt));
    }
    for item in &body {
        patch = patch.set(format!("{}.alt", keyed("body", &item.key)), json!(item.alt));
    }

    if patch.is_empty() {
        return Err(WorkerError::NothingToApply(
            "Nothing to apply (no alt strings).".to_string(),
        ));
    }

    Ok(ApplyPlan::new(
        patch,
        json!({"counts": {"featured": usize::from(featured.is_some()), "body": body.len()}}),
    ))
}
