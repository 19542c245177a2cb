//! JSON response envelope.
//!
//! Every body carries `ok`; failures add `error`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use tracing::{debug, error};

use crate::error::WorkerError;

/// `{"ok": true, ...fields}`.
///
/// Non-object `fields` are placed under `result`.
#[must_use]
pub fn ok(fields: Value) -> Response {
    let mut body = Map::new();
    body.insert("ok".to_string(), Value::Bool(true));
    match fields {
        Value::Object(map) => body.extend(map),
        Value::Null => {}
        other => {
            body.insert("result".to_string(), other);
        }
    }
    Json(Value::Object(body)).into_response()
}

impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(json!({"ok": false, "error": self.to_string()}))).into_response()
    }
}
