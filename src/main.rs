use ragfront::{api, config, logging, weaviate::WeaviateQueryEngine};
use std::sync::Arc;
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() {
    config::init_config();
    logging::init_tracing();

    let engine = WeaviateQueryEngine::new().expect("Failed to construct Weaviate client");
    tracing::info!("Connected to Weaviate client");

    let app = api::create_router(Arc::new(engine));

    let (listener, port) = bind_listener().await.expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.unwrap();
}

async fn bind_listener() -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    let port = config::get_config().server_port.unwrap_or(DEFAULT_PORT);
    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .map(|listener| (listener, port))
}
