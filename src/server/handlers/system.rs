//! Health, event trigger and job callback endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

use crate::error::{WorkerError, WorkerResult};
use crate::server::AppState;
use crate::server::input::Input;
use crate::server::response::ok;

/// Path of the synchronous job endpoint.
pub const JOBS_ENDPOINT: &str = "/api/jobs";

/// Store reachability and runtime mode.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let store_ok = match state.store.ping().await {
        Ok(reachable) => reachable,
        Err(e) => {
            warn!(error = %e, "store ping failed");
            false
        }
    };

    ok(json!({
        "storeOk": store_ok,
        "mockMode": state.config.mock_mode,
        "jobsEndpoint": JOBS_ENDPOINT,
        "eventUrl": state.dispatcher.endpoint(),
        "version": env!("CARGO_PKG_VERSION"),
        "now": Utc::now().to_rfc3339(),
    }))
}

fn event_of(input: &Input) -> WorkerResult<(String, Value)> {
    let name = input
        .str("name")
        .ok_or_else(|| WorkerError::BadRequest("Missing or invalid 'name'".to_string()))?
        .to_string();
    let data = input.value("data").cloned().unwrap_or_else(|| json!({}));
    Ok((name, data))
}

/// Hand an event to the dispatcher.
pub async fn trigger(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let (name, data) = event_of(&input)?;
    let outcome = state.dispatcher.dispatch(&name, data).await?;
    Ok(Json(outcome).into_response())
}

/// Run a job to completion; the event system calls this.
pub async fn run_job(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let (name, data) = event_of(&input)?;
    let result = state.runner.run_named(&name, data).await?;
    Ok(ok(result))
}
