//! Preview storage, preview readers and apply planners.

pub mod apply;
pub mod read;
pub mod record;

pub use apply::{
    ApplyPlan, normalize_faq, plan_article_image_alt, plan_faq, plan_gallery_alts,
    plan_image_alt, plan_short, plan_title, plan_toc,
};
pub use read::{ImageAltsPreview, KeyedAlt, TocPreviewItem};
pub use record::{PREVIEW_FIELD, PreviewRecord};
