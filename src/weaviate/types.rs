//! Shared types used by the Weaviate client and helpers.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors returned while interacting with Weaviate.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Weaviate URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Weaviate responded with an unexpected status code.
    #[error("Unexpected Weaviate response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Weaviate.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// GraphQL layer or generative module reported an error.
    #[error("GraphQL query failed: {0}")]
    Graphql(String),
    /// Response arrived without the fields the engine relies on.
    #[error("Malformed Weaviate response: {0}")]
    Malformed(String),
}

/// Result of a retrieval-augmented query: generated answer plus raw hits.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Answer generated across the retrieved snippets.
    pub summary: String,
    /// Retrieved document objects, passed through verbatim.
    pub documents: Vec<Value>,
}

#[derive(Deserialize)]
pub(crate) struct GraphqlResponse {
    #[serde(default)]
    pub(crate) data: Option<Value>,
    #[serde(default)]
    pub(crate) errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
pub(crate) struct GraphqlError {
    #[serde(default)]
    pub(crate) message: String,
}
