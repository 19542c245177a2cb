//! Structured text generation.

pub mod client;
pub mod error;
pub mod schema;

pub use client::{GenerationClient, GenerationRequest};
pub use error::GenerationError;
pub use schema::{
    FaqEntry, FaqOutput, GalleryAltsOutput, GeneratedOutput, ImageAltOutput, ImageSuggestion,
    OutputKind, ShortOutput, TitlesOutput, TocEntry, TocOutput,
};
