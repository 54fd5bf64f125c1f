//! HTTP client implementing the query engine against Weaviate.

use crate::config::get_config;
use crate::weaviate::graphql::{DOCUMENT_CLASS, build_get_query};
use crate::weaviate::types::{EngineError, GraphqlResponse, QueryOutcome};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

/// Narrow interface through which the HTTP façade reaches the query engine.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Probe whether the backing database is ready to serve requests.
    async fn is_ready(&self) -> Result<bool, EngineError>;

    /// Run retrieval plus grouped answer generation for a raw query string.
    async fn query(&self, query: &str) -> Result<QueryOutcome, EngineError>;

    /// Fetch a single stored document by its object id.
    async fn retrieve_document(&self, document_id: &str) -> Result<Value, EngineError>;
}

/// Lightweight HTTP client for the Weaviate REST and GraphQL APIs.
///
/// Owns the long-lived `reqwest` transport and the credentials loaded at
/// process start. Construct once and share through an `Arc`.
pub struct WeaviateQueryEngine {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) openai_api_key: Option<String>,
}

impl WeaviateQueryEngine {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, EngineError> {
        let config = get_config();
        let client = Client::builder().user_agent("ragfront/0.1").build()?;

        let base_url = normalize_base_url(&config.weaviate_url).map_err(EngineError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = config.weaviate_api_key.is_some(),
            has_openai_api_key = config.openai_api_key.is_some(),
            "Initialized Weaviate HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.weaviate_api_key.clone(),
            openai_api_key: config.openai_api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.bearer_auth(api_key);
        }
        // The generative module runs inside Weaviate; the model key rides along as a header.
        if let Some(openai_key) = &self.openai_api_key
            && !openai_key.is_empty()
        {
            req = req.header("X-OpenAI-Api-Key", openai_key);
        }
        req
    }
}

#[async_trait]
impl QueryEngine for WeaviateQueryEngine {
    async fn is_ready(&self) -> Result<bool, EngineError> {
        let response = self
            .request(Method::GET, "v1/.well-known/ready")
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    async fn query(&self, query: &str) -> Result<QueryOutcome, EngineError> {
        let body = json!({ "query": build_get_query(query) });
        let response = self
            .request(Method::POST, "v1/graphql")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = EngineError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Weaviate query request failed");
            return Err(error);
        }

        let payload: GraphqlResponse = response.json().await?;
        if let Some(errors) = payload.errors
            && !errors.is_empty()
        {
            let joined = errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>()
                .join("; ");
            tracing::error!(errors = %joined, "Weaviate returned GraphQL errors");
            return Err(EngineError::Graphql(joined));
        }

        let documents = payload
            .data
            .as_ref()
            .and_then(|data| data.pointer(&format!("/Get/{DOCUMENT_CLASS}")))
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                EngineError::Malformed(format!("missing Get.{DOCUMENT_CLASS} result list"))
            })?;

        let summary = extract_summary(&documents)?;
        Ok(QueryOutcome { summary, documents })
    }

    async fn retrieve_document(&self, document_id: &str) -> Result<Value, EngineError> {
        let response = self
            .request(Method::GET, &format!("v1/objects/{document_id}"))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = EngineError::UnexpectedStatus { status, body };
                tracing::error!(document_id, error = %error, "Document lookup failed");
                Err(error)
            }
        }
    }
}

/// Pull the grouped answer off the first retrieved document.
///
/// The generative module attaches its result (or its error) to the first
/// element only, so an empty result set has no answer to offer.
fn extract_summary(documents: &[Value]) -> Result<String, EngineError> {
    let first = documents
        .first()
        .ok_or_else(|| EngineError::Malformed("no documents matched the query".into()))?;
    let generate = first
        .pointer("/_additional/generate")
        .ok_or_else(|| EngineError::Malformed("generated answer missing".into()))?;

    if let Some(message) = generate.get("error").and_then(Value::as_str) {
        return Err(EngineError::Graphql(message.to_string()));
    }

    generate
        .get("groupedResult")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EngineError::Malformed("generated answer missing".into()))
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
