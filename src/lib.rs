//! Worker that generates SEO metadata for CMS documents with a local LLM.
//!
//! Jobs write suggestions into a document's `aiPreview` field; editors
//! review them and apply endpoints copy the normalized values into the real
//! fields.

#![deny(unsafe_code)] // No unsafe code
#![deny(missing_docs)] // Every public item is documented
#![deny(unused_must_use)] // Results and Options must be handled
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
// Clippy
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)] // No unwrap() outside tests
#![deny(clippy::expect_used)] // No expect() outside tests
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)] // Log through tracing
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![deny(overflowing_literals)]

/// CMS document access (Sanity HTTP API and an in-memory store).
pub mod cms;
/// Environment-driven configuration.
pub mod config;
/// Worker error type and HTTP status mapping.
pub mod error;
/// Document ids and array key generation.
pub mod ids;
/// Background jobs and event dispatch.
pub mod jobs;
/// Structured generation against the LLM provider.
pub mod llm;
/// Preview records, readers and apply planners.
pub mod preview;
/// HTTP server and API routes.
#[allow(clippy::missing_errors_doc, clippy::unused_async)]
pub mod server;
/// Entry helpers to start the worker.
pub mod start;
/// Text normalization, deduplication and slugs.
pub mod text;
