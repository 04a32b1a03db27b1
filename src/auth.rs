//! Access-token acquisition for the extraction provider.
//!
//! The pipeline only consumes a "get bearer token" capability. The concrete
//! source is Google Application Default Credentials resolved by `gcp_auth`:
//! a service-account key file, workload identity, or local gcloud user
//! credentials, whichever the environment provides.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// OAuth scope requested for Document AI calls.
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Errors raised while acquiring provider credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable credential source could be resolved.
    #[error("Failed to resolve Google credentials: {0}")]
    CredentialResolution(String),
    /// Credential source failed to mint an access token.
    #[error("Failed to acquire access token: {0}")]
    TokenAcquisition(String),
}

/// Interface implemented by bearer-token sources.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Produce a short-lived bearer token for the extraction provider.
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// Token source backed by Google Application Default Credentials.
pub struct GoogleTokenProvider {
    provider: Arc<dyn gcp_auth::TokenProvider>,
}

impl GoogleTokenProvider {
    /// Resolve the ambient credential source once; tokens are minted per call.
    pub async fn new() -> Result<Self, AuthError> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|err| AuthError::CredentialResolution(err.to_string()))?;
        tracing::debug!("Resolved Google credential source");
        Ok(Self { provider })
    }
}

#[async_trait]
impl AccessTokenProvider for GoogleTokenProvider {
    async fn access_token(&self) -> Result<String, AuthError> {
        let token = self
            .provider
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|err| AuthError::TokenAcquisition(err.to_string()))?;
        Ok(token.as_str().to_string())
    }
}
