#![deny(missing_docs)]

//! Core library for the Docintake ingestion server.

/// HTTP routing and REST handlers.
pub mod api;
/// Access-token acquisition for the extraction provider.
pub mod auth;
/// Environment-driven configuration management.
pub mod config;
/// Document AI transport integration.
pub mod docai;
/// Structured logging and tracing setup.
pub mod logging;
/// Intake metrics helpers.
pub mod metrics;
/// Extraction pipeline: upload typing, provider calls, and pattern post-processing.
pub mod pipeline;
/// Temporary upload storage.
pub mod storage;
