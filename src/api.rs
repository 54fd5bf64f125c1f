//! HTTP surface for ragfront.
//!
//! This module exposes a compact Axum router with three endpoints:
//!
//! - `GET /health` – Probe the vector database. Returns 200 `{"message": "Alive!"}` when the
//!   database is ready and 503 otherwise.
//! - `POST /query` – Run retrieval plus grouped answer generation for a raw query string and
//!   return `{"system": <answer>, "documents": <hits>}`.
//! - `POST /get_document` – Fetch one stored document by id and return `{"document": <object>}`.
//!
//! Query and document failures keep HTTP 200 and degrade the body instead
//! (`documents: []`, `document: {}`): the front end this API serves inspects the
//! body rather than the status line, so only the health endpoint signals failure
//! through the status code.

use crate::weaviate::QueryEngine;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

/// Origin allowed to reach this API from a browser.
const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Build the HTTP router exposing the query façade.
pub fn create_router<S>(engine: Arc<S>) -> Router
where
    S: QueryEngine + 'static,
{
    Router::new()
        .route("/health", get(health::<S>))
        .route("/query", post(query::<S>))
        .route("/get_document", post(get_document::<S>))
        .layer(cors_layer())
        .with_state(engine)
}

/// Credentialed CORS for the single allowed origin.
///
/// Methods and headers are mirrored from the request because wildcards cannot
/// be combined with `allow_credentials(true)`.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(HeaderValue::from_static(ALLOWED_ORIGIN))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Request body for the `POST /query` endpoint.
#[derive(Deserialize)]
struct QueryRequest {
    /// Raw query text; emptiness is left for the engine to judge.
    query: String,
}

/// Response body for the `POST /query` endpoint.
#[derive(Serialize)]
struct QueryResponse {
    /// Generated answer, or an error message prefixed with "Something went wrong!".
    system: String,
    /// Retrieved documents, empty when the engine call failed.
    documents: Vec<Value>,
}

/// Request body for the `POST /get_document` endpoint.
#[derive(Deserialize)]
struct DocumentRequest {
    /// Object id of the stored document.
    document_id: String,
}

/// Response body for the `POST /get_document` endpoint.
#[derive(Serialize)]
struct DocumentResponse {
    /// Stored document JSON, or `{}` when the lookup failed.
    document: Value,
}

/// Response body for the `GET /health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    message: String,
}

/// Report whether the backing database is reachable and ready.
async fn health<S>(State(engine): State<Arc<S>>) -> (StatusCode, Json<HealthResponse>)
where
    S: QueryEngine,
{
    match engine.is_ready().await {
        Ok(true) => {
            tracing::info!("Healthcheck passed");
            (
                StatusCode::OK,
                Json(HealthResponse {
                    message: "Alive!".into(),
                }),
            )
        }
        Ok(false) => {
            tracing::warn!("Database not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    message: "Database not ready!".into(),
                }),
            )
        }
        Err(error) => {
            tracing::error!(error = %error, "Healthcheck failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    message: format!("Healthcheck failed with {error}"),
                }),
            )
        }
    }
}

/// Answer a query with the generated summary and the retrieved documents.
async fn query<S>(
    State(engine): State<Arc<S>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse>
where
    S: QueryEngine,
{
    match engine.query(&request.query).await {
        Ok(outcome) => {
            tracing::info!(
                query = %request.query,
                documents = outcome.documents.len(),
                "Query processed"
            );
            Json(QueryResponse {
                system: outcome.summary,
                documents: outcome.documents,
            })
        }
        Err(error) => {
            tracing::error!(query = %request.query, error = %error, "Query failed");
            Json(QueryResponse {
                system: format!("Something went wrong! {error}"),
                documents: Vec::new(),
            })
        }
    }
}

/// Return one stored document by id.
async fn get_document<S>(
    State(engine): State<Arc<S>>,
    Json(request): Json<DocumentRequest>,
) -> Json<DocumentResponse>
where
    S: QueryEngine,
{
    tracing::info!(document_id = %request.document_id, "Document ID received");
    match engine.retrieve_document(&request.document_id).await {
        Ok(document) => {
            tracing::info!(document_id = %request.document_id, "Document retrieved");
            Json(DocumentResponse { document })
        }
        Err(error) => {
            tracing::error!(
                document_id = %request.document_id,
                error = %error,
                "Document retrieval failed"
            );
            Json(DocumentResponse {
                document: Value::Object(Map::new()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ALLOWED_ORIGIN, create_router};
    use crate::weaviate::{EngineError, QueryEngine, QueryOutcome};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubEngine {
        ready: Option<Result<bool, String>>,
        query_outcome: Option<Result<QueryOutcome, String>>,
        document: Option<Result<Value, String>>,
        queries: Mutex<Vec<String>>,
        document_ids: Mutex<Vec<String>>,
    }

    impl StubEngine {
        fn with_ready(ready: Result<bool, String>) -> Self {
            Self {
                ready: Some(ready),
                ..Self::default()
            }
        }

        fn with_query(outcome: Result<QueryOutcome, String>) -> Self {
            Self {
                query_outcome: Some(outcome),
                ..Self::default()
            }
        }

        fn with_document(document: Result<Value, String>) -> Self {
            Self {
                document: Some(document),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl QueryEngine for StubEngine {
        async fn is_ready(&self) -> Result<bool, EngineError> {
            self.ready
                .clone()
                .expect("stub readiness configured")
                .map_err(EngineError::Graphql)
        }

        async fn query(&self, query: &str) -> Result<QueryOutcome, EngineError> {
            self.queries.lock().await.push(query.to_string());
            self.query_outcome
                .clone()
                .expect("stub query outcome configured")
                .map_err(EngineError::Graphql)
        }

        async fn retrieve_document(&self, document_id: &str) -> Result<Value, EngineError> {
            self.document_ids.lock().await.push(document_id.to_string());
            self.document
                .clone()
                .expect("stub document configured")
                .map_err(EngineError::Graphql)
        }
    }

    async fn send(
        engine: Arc<StubEngine>,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = create_router(engine)
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("json body")
        };
        (status, headers, json)
    }

    fn get_health() -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(Body::empty())
            .expect("request")
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_alive_when_ready() {
        let engine = Arc::new(StubEngine::with_ready(Ok(true)));
        let (status, _, body) = send(engine, get_health()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Alive!" }));
    }

    #[tokio::test]
    async fn health_reports_unavailable_when_not_ready() {
        let engine = Arc::new(StubEngine::with_ready(Ok(false)));
        let (status, _, body) = send(engine, get_health()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "message": "Database not ready!" }));
    }

    #[tokio::test]
    async fn health_embeds_probe_error_text() {
        let engine = Arc::new(StubEngine::with_ready(Err("connection refused".into())));
        let (status, _, body) = send(engine, get_health()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let message = body["message"].as_str().expect("message");
        assert!(message.starts_with("Healthcheck failed with "));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn query_returns_summary_and_documents() {
        let engine = Arc::new(StubEngine::with_query(Ok(QueryOutcome {
            summary: "X is Y".into(),
            documents: vec![json!({ "id": "d1" })],
        })));
        let (status, _, body) = send(
            engine.clone(),
            post_json("/query", json!({ "query": "what is X" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "system": "X is Y", "documents": [{ "id": "d1" }] }));
        assert_eq!(*engine.queries.lock().await, vec!["what is X".to_string()]);
    }

    #[tokio::test]
    async fn query_failure_keeps_status_200_with_empty_documents() {
        let engine = Arc::new(StubEngine::with_query(Err("timeout".into())));
        let (status, _, body) = send(engine, post_json("/query", json!({ "query": "q" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "system": "Something went wrong! GraphQL query failed: timeout",
                "documents": []
            })
        );
    }

    #[tokio::test]
    async fn empty_query_string_is_passed_through() {
        let engine = Arc::new(StubEngine::with_query(Ok(QueryOutcome {
            summary: String::new(),
            documents: Vec::new(),
        })));
        let (status, _, _) = send(
            engine.clone(),
            post_json("/query", json!({ "query": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(*engine.queries.lock().await, vec![String::new()]);
    }

    #[tokio::test]
    async fn get_document_returns_raw_object() {
        let document = json!({
            "id": "doc-123",
            "properties": { "doc_name": "guide.md" }
        });
        let engine = Arc::new(StubEngine::with_document(Ok(document.clone())));
        let (status, _, body) = send(
            engine.clone(),
            post_json("/get_document", json!({ "document_id": "doc-123" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "document": document }));
        assert_eq!(
            *engine.document_ids.lock().await,
            vec!["doc-123".to_string()]
        );
    }

    #[tokio::test]
    async fn get_document_failure_keeps_status_200_with_empty_object() {
        let engine = Arc::new(StubEngine::with_document(Err("not found".into())));
        let (status, _, body) = send(
            engine,
            post_json("/get_document", json!({ "document_id": "missing" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "document": {} }));
    }

    #[tokio::test]
    async fn preflight_from_allowed_origin_succeeds() {
        let engine = Arc::new(StubEngine::default());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/query")
            .header("origin", ALLOWED_ORIGIN)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .expect("request");
        let (status, headers, _) = send(engine, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some(ALLOWED_ORIGIN)
        );
        assert_eq!(
            headers
                .get("access-control-allow-credentials")
                .and_then(|value| value.to_str().ok()),
            Some("true")
        );
        // mirrored back rather than wildcarded
        assert_eq!(
            headers
                .get("access-control-allow-methods")
                .and_then(|value| value.to_str().ok()),
            Some("POST")
        );
    }

    #[tokio::test]
    async fn preflight_from_foreign_origin_is_not_allowed() {
        let engine = Arc::new(StubEngine::default());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/query")
            .header("origin", "http://evil.example")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .expect("request");
        let (_, headers, _) = send(engine, request).await;

        assert!(headers.get("access-control-allow-origin").is_none());
    }
}
