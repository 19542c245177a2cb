//! Article preview jobs.

use serde_json::{Map, Value, json};

use crate::cms::document::{array_at, is_defined, portable_text_words, str_at};
use crate::error::WorkerResult;
use crate::jobs::{JobData, JobKind, JobRunner};
use crate::llm::{FaqEntry, FaqOutput, GeneratedOutput, GenerationRequest, TocEntry, TocOutput};
use crate::preview::{PreviewRecord, normalize_faq};
use crate::text::{
    FieldPolicies, clamp_with_ellipsis, dedup_key, deduplicate_keyed, slugify,
    strip_markup_and_controls,
};

const DEFAULT_TOC_ENTRIES: usize = 8;
const MAX_TOC_ENTRIES: usize = 20;
const DEFAULT_FAQ_ITEMS: usize = 5;
const MAX_FAQ_ITEMS: usize = 10;
/// Words of body text given to the FAQ prompt.
const FAQ_BODY_WORDS: usize = 200;
/// Words of body text used as TOC source when no preview is supplied.
const TOC_BODY_WORDS: usize = 600;

/// Fallback article label when the title is blank.
const UNTITLED_ARTICLE: &str = "บทความ";

fn fallback_toc() -> GeneratedOutput {
    let entry = |text: &str, anchor: &str| TocEntry {
        text: text.to_string(),
        anchor: anchor.to_string(),
    };
    GeneratedOutput::Toc(TocOutput {
        toc: vec![
            entry("บทนำ", "intro"),
            entry("หัวข้อสำคัญ", "key-points"),
            entry("สรุป", "summary"),
        ],
    })
}

/// Generate a table of contents from `bodyPreview` or the body text.
///
/// # Errors
/// Bad input, missing article or store failure.
pub async fn toc_generate(runner: &JobRunner, data: &JobData) -> WorkerResult<Value> {
    let id = data.document_id()?;
    let doc = runner.load(&id, "Article").await?;
    let max = data.max_or(DEFAULT_TOC_ENTRIES, MAX_TOC_ENTRIES);

    let source = data
        .body_preview
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| portable_text_words(&doc, "body", TOC_BODY_WORDS), str::to_string);

    let prompt = format!(
        "Build a table of contents with at most {max} entries for the article below. \
         Each entry has the heading text and a kebab-case anchor.\n\n{source}"
    );
    let request = GenerationRequest::new(prompt, fallback_toc())
        .with_max_items(max)
        .with_max_output_tokens(512);

    let entries = match runner.generator().generate(request).await {
        GeneratedOutput::Toc(out) => out.toc,
        _ => Vec::new(),
    };

    let mut toc = deduplicate_keyed(
        entries.into_iter().map(|e| {
            let text = strip_markup_and_controls(&e.text);
            let anchor = match slugify(&e.anchor) {
                a if a.is_empty() => slugify(&text),
                a => a,
            };
            TocEntry { text, anchor }
        }),
        |e| dedup_key(&e.anchor),
        |e| !e.text.is_empty() && !e.anchor.is_empty(),
    );
    toc.truncate(max);

    let result = json!({"toc": toc});
    let record = PreviewRecord::new(JobKind::ArticleTocGenerate.preview_event(), result.clone())
        .with_meta(data.meta.clone());
    runner.write_preview(&id, record).await?;

    Ok(json!({"ok": true, "docId": id.as_str(), "result": result}))
}

/// Inputs for the FAQ prompt and its fallback.
struct FaqSource<'a> {
    title: Option<&'a str>,
    excerpt: Option<&'a str>,
    body: String,
    lang: &'a str,
    limit: usize,
}

/// Template FAQ used when generation yields nothing usable.
///
/// Thai unless `lang` starts with `en`.
fn naive_faq(source: &FaqSource<'_>, policies: &FieldPolicies) -> Vec<FaqEntry> {
    let english = source.lang.starts_with("en");
    let base = source
        .title
        .map_or_else(|| if english { "this article" } else { "บทความนี้" }, str::trim);
    let excerpt = source.excerpt.map(str::trim).filter(|e| !e.is_empty());
    let body = source.body.trim();
    let body_or = |max: usize, otherwise: &str| {
        if body.is_empty() {
            otherwise.to_string()
        } else {
            clamp_with_ellipsis(body, max)
        }
    };

    let qa = |question: String, answer: String| FaqEntry { question, answer };
    let pick = |en: &str, th: &str| if english { en.to_string() } else { th.to_string() };

    let items = vec![
        qa(
            pick(&format!("What is {base} about?"), &format!("{base}เกี่ยวกับอะไร?")),
            excerpt.map_or_else(
                || {
                    pick(
                        &format!("Summary: {base} covers key points and practical insights."),
                        &format!("สรุปย่อ: {base}ครอบคลุมประเด็นสำคัญและแนวคิดหลักที่ผู้อ่านควรรู้"),
                    )
                },
                str::to_string,
            ),
        ),
        qa(
            pick(
                &format!("What are the key takeaways from {base}?"),
                &format!("ประเด็นสำคัญของ{base}คืออะไรบ้าง?"),
            ),
            excerpt.map_or_else(
                || body_or(160, &pick("Several key points.", "มีหัวข้อหลักหลายประการที่ควรทราบ")),
                str::to_string,
            ),
        ),
        qa(
            pick(&format!("Who should read {base}?"), &format!("ใครควรอ่าน{base}?")),
            pick(
                "Readers seeking a concise overview and actionable guidance.",
                "ผู้อ่านที่ต้องการเข้าใจภาพรวมและแนวทางปฏิบัติจากบทความนี้",
            ),
        ),
        qa(
            pick(
                &format!("What are the recommended steps from {base}?"),
                &format!("{base}มีแนวทางแนะนำอย่างไร?"),
            ),
            body_or(
                200,
                &pick(
                    "It suggests principles and examples.",
                    "บทความนี้แนะนำหลักการและตัวอย่างเพื่อประยุกต์ใช้",
                ),
            ),
        ),
        qa(
            pick("Any caveats or additional tips?", "ข้อควรระวัง/คำแนะนำเพิ่มเติม?"),
            pick(
                "Test with real cases and keep content up-to-date.",
                "ควรทดสอบกับเคสจริง และอัปเดตข้อมูลตามบริบทล่าสุด",
            ),
        ),
    ];

    let mut items = normalize_faq(items, policies);
    items.truncate(source.limit);
    items
}

/// Generate an FAQ; falls back to a template FAQ.
///
/// `max` is clamped to 1..=10 (default 5); `meta.lang` (default `th`) and
/// `meta.tone` (default `concise`) steer the prompt.
///
/// # Errors
/// Bad input, missing article or store failure.
pub async fn faq_generate(runner: &JobRunner, data: &JobData) -> WorkerResult<Value> {
    let id = data.document_id()?;
    let doc = runner.load(&id, "Article").await?;
    let policies = runner.policies();

    let source = FaqSource {
        title: str_at(&doc, "title"),
        excerpt: str_at(&doc, "excerpt"),
        body: portable_text_words(&doc, "body", FAQ_BODY_WORDS),
        lang: data.meta_str("lang").unwrap_or("th"),
        limit: data.max_or(DEFAULT_FAQ_ITEMS, MAX_FAQ_ITEMS),
    };
    let tone = data.meta_str("tone").unwrap_or("concise");
    let fallback = naive_faq(&source, policies);

    let system = format!(
        "You generate concise FAQ entries for an article. Return JSON only. Language: {}. Tone: {tone}. \
         Question at most 140 characters, answer at most 600 characters, at most {} entries, no duplicates.",
        source.lang, source.limit,
    );
    let prompt = format!(
        "Title: {}\nExcerpt: {}\nBody (first {FAQ_BODY_WORDS} words): {}\nPlease generate {} Q&A.",
        source.title.unwrap_or("-"),
        source.excerpt.unwrap_or("-"),
        if source.body.is_empty() { "-" } else { source.body.as_str() },
        source.limit,
    );
    let request = GenerationRequest::new(
        prompt,
        GeneratedOutput::Faq(FaqOutput {
            faq: fallback.clone(),
        }),
    )
    .with_system(system)
    .with_max_items(source.limit)
    .with_temperature(0.2);

    let generated = match runner.generator().generate(request).await {
        GeneratedOutput::Faq(out) => out.faq,
        _ => Vec::new(),
    };
    let mut items = normalize_faq(generated, policies);
    items.truncate(source.limit);
    if items.is_empty() {
        items = fallback;
    }

    let count = items.len();
    let user_id = data.meta_str("userId").unwrap_or("worker");
    let record = PreviewRecord::new(
        JobKind::ArticleFaqGenerate.preview_event(),
        json!({"faq": items}),
    )
    .with_meta(json!({"userId": user_id}));
    let commit = runner.write_preview(&id, record).await?;

    Ok(json!({"ok": true, "docId": id.as_str(), "count": count, "resId": commit.document_id}))
}

/// Derive featured and body image alts from the title and captions.
///
/// No generation call: captions are preferred, then the title with the image
/// position.
///
/// # Errors
/// Bad input, missing article or store failure.
pub async fn image_alt_generate(runner: &JobRunner, data: &JobData) -> WorkerResult<Value> {
    let id = data.document_id()?;
    let doc = runner.load(&id, "Article").await?;
    let policy = &runner.policies().image_alt;

    let base = str_at(&doc, "title").map_or(UNTITLED_ARTICLE, str::trim);
    let mut image_alts = Map::new();

    let featured = is_defined(&doc, "featuredImage.asset");
    if featured {
        let alt = match str_at(&doc, "featuredImage.caption") {
            Some(caption) => format!("{base} — {}", caption.trim()),
            None => format!("ภาพประกอบ: {base}"),
        };
        image_alts.insert("featured".to_string(), json!({"alt": policy.apply(&alt)}));
    }

    let items: Vec<Value> = array_at(&doc, "body")
        .iter()
        .filter(|node| str_at(node, "_type") == Some("image"))
        .enumerate()
        .filter_map(|(i, node)| {
            let key = str_at(node, "_key")?;
            let alt = str_at(node, "caption").map_or_else(
                || format!("{base} — รูปภาพที่ {}", i + 1),
                |caption| caption.trim().to_string(),
            );
            Some(json!({"key": key, "alt": policy.apply(&alt)}))
        })
        .collect();
    let body_count = items.len();
    if !items.is_empty() {
        image_alts.insert("body".to_string(), json!({"items": items}));
    }

    let user_id = data.meta_str("userId").unwrap_or("system");
    let record = PreviewRecord::new(
        JobKind::ArticleImageAltGenerate.preview_event(),
        json!({"imageAlts": image_alts}),
    )
    .with_meta(json!({"userId": user_id}));
    runner.write_preview(&id, record).await?;

    Ok(json!({
        "ok": true,
        "docId": id.as_str(),
        "featured": featured,
        "bodyCount": body_count,
    }))
}
