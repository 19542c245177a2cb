//! Sanity data API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::cms::{CommitResult, DocumentStore, Patch, StoreError};
use crate::config::CmsConfig;
use crate::ids::DocumentId;

/// Connect timeout for data API requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Placeholder bound to `$self` when no document is excluded.
const NO_SELF: &str = "__none__";

const SLUG_OWNER_QUERY: &str = r#"*[defined(slug.current) && slug.current == $slug && !(_id in [$self, "drafts." + $self])][0]{_id, _type, name, title}"#;

const PING_QUERY: &str = "count(*[defined(_id)]) > 0";

#[derive(Deserialize)]
struct DocResponse {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutateResponse {
    transaction_id: Option<String>,
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Deserialize)]
struct MutateResult {
    id: Option<String>,
}

/// HTTP-backed store for one Sanity project and dataset.
pub struct SanityStore {
    client: Client,
    base: Url,
    dataset: String,
    api_version: String,
    token: Option<String>,
}

impl SanityStore {
    /// Build a store from configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn new(config: &CmsConfig) -> Result<Self, StoreError> {
        if config.project_id.is_empty() && config.api_host.is_none() {
            return Err(StoreError::Config("missing Sanity project id".to_string()));
        }

        let base = Url::parse(&config.base_url())?;
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base,
            dataset: config.dataset.clone(),
            api_version: config.api_version.clone(),
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, action: &str, tail: &str) -> Result<Url, StoreError> {
        let path = format!(
            "v{}/data/{action}/{}{tail}",
            self.api_version.trim_start_matches('v'),
            self.dataset
        );
        Ok(self.base.join(&path)?)
    }

    fn doc_url(&self, id: &DocumentId) -> Result<Url, StoreError> {
        self.endpoint("doc", &format!("/{id}"))
    }

    fn query_url(&self, query: &str, params: &[(&str, Value)]) -> Result<Url, StoreError> {
        let mut url = self.endpoint("query", "")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }
        Ok(url)
    }

    fn mutate_url(&self) -> Result<Url, StoreError> {
        let mut url = self.endpoint("mutate", "")?;
        url.query_pairs_mut()
            .append_pair("returnIds", "true")
            .append_pair("autoGenerateArrayKeys", "true");
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "sanity request failed");
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn query(&self, query: &str, params: &[(&str, Value)]) -> Result<Value, StoreError> {
        let url = self.query_url(query, params)?;
        let response: QueryResponse = self.send(self.client.get(url)).await?;
        Ok(response.result)
    }
}

/// Request body for a single patch mutation.
fn mutation_body(patch: &Patch) -> Value {
    json!({ "mutations": [{ "patch": patch }] })
}

#[async_trait]
impl DocumentStore for SanityStore {
    async fn get_document(&self, id: &DocumentId) -> Result<Option<Value>, StoreError> {
        let url = self.doc_url(id)?;
        let response: DocResponse = self.send(self.client.get(url)).await?;
        Ok(response.documents.into_iter().next())
    }

    async fn commit(&self, patch: Patch) -> Result<CommitResult, StoreError> {
        let url = self.mutate_url()?;
        let body = mutation_body(&patch);
        let response: MutateResponse = self.send(self.client.post(url).json(&body)).await?;

        let document_id = response
            .results
            .into_iter()
            .find_map(|r| r.id)
            .unwrap_or(patch.id);
        debug!(id = %document_id, tx = ?response.transaction_id, "patch committed");

        Ok(CommitResult {
            transaction_id: response.transaction_id,
            document_id,
        })
    }

    async fn find_slug_owner(
        &self,
        slug: &str,
        self_id: Option<&DocumentId>,
    ) -> Result<Option<Value>, StoreError> {
        let own = self_id.map_or(NO_SELF, DocumentId::as_str);
        let result = self
            .query(
                SLUG_OWNER_QUERY,
                &[("slug", json!(slug)), ("self", json!(own))],
            )
            .await?;
        Ok(if result.is_null() { None } else { Some(result) })
    }

    async fn ping(&self) -> Result<bool, StoreError> {
        let result = self.query(PING_QUERY, &[]).await?;
        Ok(result.as_bool().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SanityStore {
        let config = CmsConfig {
            project_id: "abc123".to_string(),
            token: Some("sk".to_string()),
            ..CmsConfig::default()
        };
        SanityStore::new(&config).unwrap()
    }

    #[test]
    fn test_requires_project() {
        assert!(SanityStore::new(&CmsConfig::default()).is_err());
    }

    #[test]
    fn test_doc_url() {
        let url = store().doc_url(&DocumentId::parse("drafts.p1").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc123.api.sanity.io/v2025-01-01/data/doc/production/p1"
        );
    }

    #[test]
    fn test_query_url_encodes_params_as_json() {
        let url = store()
            .query_url("*[slug.current == $slug]", &[("slug", json!("mini-wallet"))])
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("query".to_string(), "*[slug.current == $slug]".to_string()));
        assert_eq!(pairs[1], ("$slug".to_string(), "\"mini-wallet\"".to_string()));
    }

    #[test]
    fn test_mutate_url_and_body() {
        let url = store().mutate_url().unwrap();
        assert_eq!(url.path(), "/v2025-01-01/data/mutate/production");
        assert_eq!(url.query(), Some("returnIds=true&autoGenerateArrayKeys=true"));

        let patch = Patch::new(&DocumentId::parse("p1").unwrap()).set("image.alt", json!("alt"));
        let body = mutation_body(&patch);
        assert_eq!(body["mutations"][0]["patch"]["id"], "p1");
        assert_eq!(body["mutations"][0]["patch"]["set"]["image.alt"], "alt");
    }
}
