#![deny(missing_docs)]

//! Core library for the ragfront HTTP server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Weaviate query engine integration.
pub mod weaviate;
