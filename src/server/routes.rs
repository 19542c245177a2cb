//! Route table.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use super::handlers::{article, product, slug, system};
use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/ai/health", get(system::health))
        .route("/api/ai/trigger", post(system::trigger))
        .route(system::JOBS_ENDPOINT, post(system::run_job))
        .route("/api/ai/get-titles", get(product::get_titles).post(product::get_titles))
        .route("/api/ai/apply-title", post(product::apply_title))
        .route("/api/ai/get-short", get(product::get_short).post(product::get_short))
        .route("/api/ai/apply-short", post(product::apply_short))
        .route("/api/ai/get-image-alt", get(product::get_image_alt).post(product::get_image_alt))
        .route("/api/ai/apply-image-alt", post(product::apply_image_alt))
        .route(
            "/api/ai/get-gallery-alts",
            get(product::get_gallery_alts).post(product::get_gallery_alts),
        )
        .route("/api/ai/apply-gallery-alts", post(product::apply_gallery_alts))
        .route("/api/ai/get-toc", get(article::get_toc).post(article::get_toc))
        .route("/api/ai/apply-toc", post(article::apply_toc))
        .route("/api/ai/get-faq", get(article::get_faq).post(article::get_faq))
        .route("/api/ai/apply-faq", post(article::apply_faq))
        .route(
            "/api/ai/get-article-image-alt",
            get(article::get_article_image_alt).post(article::get_article_image_alt),
        )
        .route("/api/ai/apply-article-image-alt", post(article::apply_article_image_alt))
        .route("/api/ai/slug-check", get(slug::slug_check).post(slug::slug_check))
        .route("/api/ai/slug-generate", get(slug::slug_generate).post(slug::slug_generate))
        .with_state(state)
}
