//! Request parameters merged from the query string and a JSON body.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Query, Request};
use serde_json::{Map, Value};

use crate::error::{WorkerError, WorkerResult};
use crate::ids::DocumentId;

/// Parameters of one request. Query string values win over body fields.
#[derive(Debug, Clone, Default)]
pub struct Input(Map<String, Value>);

impl Input {
    /// Merge `query` over a JSON object `body`.
    ///
    /// # Errors
    /// [`WorkerError::BadRequest`] when a non-empty body is not a JSON object.
    pub fn from_parts(query: HashMap<String, String>, body: &[u8]) -> WorkerResult<Self> {
        let mut fields = if body.iter().all(u8::is_ascii_whitespace) {
            Map::new()
        } else {
            match serde_json::from_slice::<Value>(body) {
                Ok(Value::Object(map)) => map,
                _ => return Err(WorkerError::BadRequest("Invalid JSON body".to_string())),
            }
        };

        for (key, value) in query {
            if !value.is_empty() {
                fields.insert(key, Value::String(value));
            }
        }

        Ok(Self(fields))
    }

    /// Raw value of a field.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Trimmed, non-empty string field.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Integer field given as a JSON number or a numeric string.
    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean field: JSON `true` or `1`/`true`/`yes`/`on`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            Some(Value::String(s)) => {
                matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
            }
            _ => false,
        }
    }

    /// Published id from `docId`.
    ///
    /// # Errors
    /// [`WorkerError::BadRequest`] when absent or empty.
    pub fn doc_id(&self) -> WorkerResult<DocumentId> {
        self.str("docId")
            .and_then(DocumentId::parse)
            .ok_or_else(WorkerError::missing_doc_id)
    }
}

impl<S> FromRequest<S> for Input
where
    S: Send + Sync,
{
    type Rejection = WorkerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .map(|Query(q)| q)
            .unwrap_or_default();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| WorkerError::BadRequest(e.body_text()))?;
        Self::from_parts(query, &body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_query_overrides_body() {
        let input = Input::from_parts(
            query(&[("docId", "drafts.q1")]),
            br#"{"docId": "b1", "index": 2}"#,
        )
        .unwrap();
        assert_eq!(input.doc_id().unwrap().as_str(), "q1");
        assert_eq!(input.int("index"), Some(2));
    }

    #[test]
    fn test_empty_and_invalid_bodies() {
        let input = Input::from_parts(HashMap::new(), b"  ").unwrap();
        assert!(matches!(input.doc_id(), Err(WorkerError::BadRequest(_))));

        let err = Input::from_parts(HashMap::new(), b"{not json").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON body");
        assert!(Input::from_parts(HashMap::new(), b"[1, 2]").is_err());
    }

    #[test]
    fn test_flags_and_numbers() {
        let input = Input::from_parts(
            query(&[("debug", "1"), ("limit", "3")]),
            &serde_json::to_vec(&json!({"dryRun": true, "data": null})).unwrap(),
        )
        .unwrap();
        assert!(input.flag("debug"));
        assert!(input.flag("dryRun"));
        assert!(!input.flag("missing"));
        assert_eq!(input.int("limit"), Some(3));
        assert!(input.value("data").is_none());
    }
}
