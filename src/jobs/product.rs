//! Product preview jobs.

use serde_json::{Value, json};

use crate::cms::document::{array_at, is_defined, str_at};
use crate::error::{WorkerError, WorkerResult};
use crate::jobs::{JobData, JobKind, JobRunner};
use crate::llm::{
    GalleryAltsOutput, GeneratedOutput, GenerationRequest, ImageAltOutput, ImageSuggestion,
    ShortOutput, TitlesOutput,
};
use crate::preview::PreviewRecord;
use crate::text::{dedup_key, deduplicate_keyed, slugify, strip_markup_and_controls};

const DEFAULT_TITLE_COUNT: usize = 3;
const MAX_TITLE_COUNT: usize = 10;
const DEFAULT_SHORT_LIMIT: i64 = 160;

fn fallback_titles() -> GeneratedOutput {
    GeneratedOutput::Titles(TitlesOutput {
        titles: vec![
            "กระเป๋าหนังวัวแท้ ทรงมินิ ใช้ทุกวัน".to_string(),
            "Mini Leather Wallet - Hand-stitched".to_string(),
            "Compact Cowhide Wallet, Everyday Use".to_string(),
        ],
    })
}

fn fallback_short() -> GeneratedOutput {
    GeneratedOutput::Short(ShortOutput {
        short_description: "กระเป๋าหนังวัวแท้ทนทาน ดีไซน์มินิมอล เหมาะใช้ทุกวัน น้ำหนักเบา"
            .to_string(),
        meta_description:
            "กระเป๋าหนังวัวแท้ ทรงมินิมอล น้ำหนักเบา ใช้ได้ทุกวัน จุของพอดี เย็บมือทุกชิ้น เหมาะเป็นของขวัญ ดูแลง่าย ยิ่งใช้ยิ่งสวย สำหรับผู้ที่ชอบความเรียบง่ายและคุณภาพ"
                .to_string(),
    })
}

fn product_name<'a>(data: &'a JobData, doc: &'a Value) -> Option<&'a str> {
    data.name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| str_at(doc, "name"))
}

fn job_result(id: &str, result: &Value) -> Value {
    json!({"ok": true, "docId": id, "result": result})
}

/// Suggest up to `max` titles (default 3).
///
/// # Errors
/// Bad input, missing product or store failure.
pub async fn title_suggest(runner: &JobRunner, data: &JobData) -> WorkerResult<Value> {
    let id = data.document_id()?;
    let doc = runner.load(&id, "Product").await?;
    let max = data.max_or(DEFAULT_TITLE_COUNT, MAX_TITLE_COUNT);
    let name = product_name(data, &doc).map(str::to_string);

    let prompt = format!(
        "Suggest {max} concise product titles (at most 60 characters each) for the product \"{}\". Description: {}",
        name.as_deref().unwrap_or("-"),
        str_at(&doc, "shortDescription").unwrap_or("-"),
    );
    let request = GenerationRequest::new(prompt, fallback_titles())
        .with_max_items(max)
        .with_max_output_tokens(256);

    let titles = match runner.generator().generate(request).await {
        GeneratedOutput::Titles(out) => out.titles,
        _ => Vec::new(),
    };

    let policy = &runner.policies().title;
    let mut titles = deduplicate_keyed(
        titles.iter().map(|t| policy.apply(t)),
        |t| dedup_key(t),
        |t| !t.is_empty(),
    );
    titles.truncate(max);

    let result = json!({"titles": titles});
    let record = PreviewRecord::new(JobKind::ProductTitleSuggest.preview_event(), result.clone())
        .with_name(name)
        .with_meta(data.meta.clone());
    runner.write_preview(&id, record).await?;

    Ok(job_result(id.as_str(), &result))
}

/// Generate short and meta descriptions.
///
/// # Errors
/// Bad input, missing product or store failure.
pub async fn short_generate(runner: &JobRunner, data: &JobData) -> WorkerResult<Value> {
    let id = data.document_id()?;
    let doc = runner.load(&id, "Product").await?;
    let limit = data.limit.unwrap_or(DEFAULT_SHORT_LIMIT).max(80);
    let name = product_name(data, &doc).map(str::to_string);

    let prompt = format!(
        "Write a product short description (at most {limit} characters) and an SEO meta description \
         (140 to 160 characters) for \"{}\".",
        name.as_deref().unwrap_or("-"),
    );
    let request = GenerationRequest::new(prompt, fallback_short()).with_max_output_tokens(512);

    let (short, meta) = match runner.generator().generate(request).await {
        GeneratedOutput::Short(out) => (out.short_description, out.meta_description),
        _ => (String::new(), String::new()),
    };

    let result = json!({
        "short_description": strip_markup_and_controls(&short),
        "meta_description": strip_markup_and_controls(&meta),
    });
    let record = PreviewRecord::new(JobKind::ProductShortGenerate.preview_event(), result.clone())
        .with_name(name)
        .with_meta(data.meta.clone());
    runner.write_preview(&id, record).await?;

    Ok(job_result(id.as_str(), &result))
}

/// Suggest the main image alt and a file name.
///
/// # Errors
/// Bad input, missing product, product without a main image or store failure.
pub async fn image_alt_rename(runner: &JobRunner, data: &JobData) -> WorkerResult<Value> {
    let id = data.document_id()?;
    let doc = runner.load(&id, "Product").await?;
    if !is_defined(&doc, "image.asset") {
        return Err(WorkerError::BadRequest("Product has no main image".to_string()));
    }

    let name = str_at(&doc, "name").map(str::to_string);
    let base = str_at(&doc, "slug.current")
        .map(str::to_string)
        .unwrap_or_else(|| slugify(name.as_deref().unwrap_or("product")));
    let base = if base.is_empty() { "product".to_string() } else { base };
    let default_filename = format!("{base}.jpg");

    let fallback = GeneratedOutput::ImageAlt(ImageAltOutput {
        image: ImageSuggestion {
            alt: format!("{} product photo", name.as_deref().unwrap_or("item")),
            filename: Some(default_filename.clone()),
        },
    });
    let prompt = format!(
        "Write a concise ALT (English, 6-12 words) for the product main image. Product name: \"{}\".",
        name.as_deref().unwrap_or("-"),
    );
    let request = GenerationRequest::new(prompt, fallback).with_max_output_tokens(256);

    let suggestion = match runner.generator().generate(request).await {
        GeneratedOutput::ImageAlt(out) => out.image,
        _ => ImageSuggestion {
            alt: String::new(),
            filename: None,
        },
    };

    let alt = runner.policies().image_alt.apply(&suggestion.alt);
    let filename = suggestion
        .filename
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .unwrap_or(default_filename);

    let result = json!({"image": {"alt": alt, "filename": filename}});
    let record = PreviewRecord::new(JobKind::ProductImageAltRename.preview_event(), result.clone())
        .with_name(name);
    runner.write_preview(&id, record).await?;

    Ok(job_result(id.as_str(), &result))
}

/// Suggest one alt per gallery image with an asset.
///
/// # Errors
/// Bad input, missing product, empty gallery or store failure.
pub async fn gallery_alt_generate(runner: &JobRunner, data: &JobData) -> WorkerResult<Value> {
    let id = data.document_id()?;
    let doc = runner.load(&id, "Product").await?;
    let name = str_at(&doc, "name").map(str::to_string);
    let label = name.as_deref().unwrap_or("item");

    let images: Vec<(&str, &str)> = array_at(&doc, "gallery")
        .iter()
        .filter_map(|item| {
            let key = str_at(item, "_key")?;
            let reference = str_at(item, "asset._ref")?;
            Some((key, reference))
        })
        .collect();

    if images.is_empty() {
        return Err(WorkerError::BadRequest("No gallery images".to_string()));
    }

    let count = images.len();
    let default_alts: Vec<String> = (1..=count)
        .map(|n| format!("product gallery photo {n} - {label}"))
        .collect();

    let prompt = format!(
        "Generate concise ALT text in English (6-12 words) for each gallery image of product \"{label}\". \
         Return an array \"gallery_alts\" with {count} items."
    );
    let request = GenerationRequest::new(
        prompt,
        GeneratedOutput::GalleryAlts(GalleryAltsOutput {
            gallery_alts: default_alts.clone(),
        }),
    )
    .with_max_items(count)
    .with_max_output_tokens(512);

    let alts = match runner.generator().generate(request).await {
        GeneratedOutput::GalleryAlts(out) => out.gallery_alts,
        _ => Vec::new(),
    };

    let policy = &runner.policies().image_alt;
    let gallery: Vec<Value> = images
        .iter()
        .enumerate()
        .map(|(i, (key, reference))| {
            let alt = alts
                .get(i)
                .map(|a| policy.apply(a))
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| policy.apply(&default_alts[i]));
            json!({"key": key, "ref": reference, "alt": alt})
        })
        .collect();

    let result = json!({"gallery": gallery});
    let record =
        PreviewRecord::new(JobKind::ProductGalleryAltGenerate.preview_event(), result.clone())
            .with_name(name);
    runner.write_preview(&id, record).await?;

    Ok(json!({"ok": true, "docId": id.as_str(), "count": count, "result": result}))
}
