//! Document AI transport integration.

pub mod client;
pub mod types;

pub use client::DocAiClient;
pub use types::{DocAiError, DocumentMime, ProcessResponse};
