//! Weaviate query engine integration.

pub mod client;
pub mod graphql;
pub mod types;

pub use client::{QueryEngine, WeaviateQueryEngine};
pub use types::{EngineError, QueryOutcome};
