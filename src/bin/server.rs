//! Content AI worker binary.
//! Run with: cargo run --bin content-ai-worker

use std::process::ExitCode;

use content_ai_worker::start;

fn main() -> ExitCode {
    start::run()
}
