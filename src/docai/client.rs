//! HTTP client wrapper for the Document AI `:process` endpoint.

use crate::config::get_config;
use crate::docai::types::{DocAiError, DocumentMime, ProcessRequest, ProcessResponse, RawDocument};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use std::time::Duration;

/// Upper bound on one extraction call; exceeding it surfaces as a connection failure.
const PROCESS_TIMEOUT: Duration = Duration::from_secs(120);

/// Lightweight HTTP client for Document AI processing calls.
pub struct DocAiClient {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
}

impl DocAiClient {
    /// Construct a client addressing the processor named in the environment configuration.
    pub fn from_config() -> Result<Self, DocAiError> {
        let config = get_config();
        let endpoint = format_process_endpoint(
            &config.project_id,
            &config.location,
            &config.processor_id,
        );
        Self::new(endpoint)
    }

    /// Construct a client against an explicit `:process` endpoint URL.
    pub fn new(endpoint: String) -> Result<Self, DocAiError> {
        let client = Client::builder()
            .user_agent("docintake/0.1")
            .timeout(PROCESS_TIMEOUT)
            .build()
            .map_err(DocAiError::Request)?;
        tracing::debug!(endpoint = %endpoint, "Initialized Document AI HTTP client");
        Ok(Self { client, endpoint })
    }

    /// Submit one document for text extraction.
    ///
    /// One attempt per request: a failed call is terminal, with the failure
    /// classified as a provider rejection, a connectivity fault, or a request
    /// that could not be dispatched at all.
    pub async fn process(
        &self,
        bytes: &[u8],
        mime_type: DocumentMime,
        token: &str,
    ) -> Result<ProcessResponse, DocAiError> {
        let body = ProcessRequest {
            raw_document: RawDocument {
                content: BASE64_STANDARD.encode(bytes),
                mime_type: mime_type.as_str().to_string(),
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = DocAiError::Rejected { status, body };
            tracing::error!(error = %error, "Document AI request failed");
            return Err(error);
        }

        response.json().await.map_err(classify_transport_error)
    }
}

/// Builder problems mean the call was never attempted; everything else reached
/// the wire without producing a usable response.
fn classify_transport_error(err: reqwest::Error) -> DocAiError {
    if err.is_builder() {
        DocAiError::Request(err)
    } else {
        DocAiError::Connection(err)
    }
}

fn format_process_endpoint(project: &str, location: &str, processor: &str) -> String {
    format!(
        "https://{location}-documentai.googleapis.com/v1/projects/{project}/locations/{location}/processors/{processor}:process"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn test_client(endpoint: String) -> DocAiClient {
        DocAiClient {
            client: Client::builder()
                .user_agent("docintake-test")
                .build()
                .expect("client"),
            endpoint,
        }
    }

    #[test]
    fn formats_the_regional_process_endpoint() {
        assert_eq!(
            format_process_endpoint("demo-project", "us", "proc-1"),
            "https://us-documentai.googleapis.com/v1/projects/demo-project/locations/us/processors/proc-1:process"
        );
    }

    #[tokio::test]
    async fn process_emits_expected_request() {
        let server = MockServer::start_async().await;
        let path = "/v1/projects/demo/locations/us/processors/proc-1:process";

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path)
                    .header("authorization", "Bearer test-token")
                    .json_body(json!({
                        "rawDocument": {
                            "content": "ZG9jIGJ5dGVz",
                            "mimeType": "application/pdf"
                        }
                    }));
                then.status(200).json_body(json!({
                    "document": { "text": "extracted text" }
                }));
            })
            .await;

        let client = test_client(server.url(path));
        let response = client
            .process(b"doc bytes", DocumentMime::Pdf, "test-token")
            .await
            .expect("process response");

        mock.assert();
        assert_eq!(response.text(), Some("extracted text"));
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_rejection() {
        let server = MockServer::start_async().await;
        let path = "/v1/projects/demo/locations/us/processors/proc-1:process";

        server
            .mock_async(|when, then| {
                when.method(POST).path(path);
                then.status(429).body("quota exhausted");
            })
            .await;

        let client = test_client(server.url(path));
        let error = client
            .process(b"doc bytes", DocumentMime::Png, "test-token")
            .await
            .expect_err("rejected call");

        match error {
            DocAiError::Rejected { status, body } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(body, "quota exhausted");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_classifies_as_connection_failure() {
        // Port 9 (discard) is not listening; the connect attempt fails fast.
        let client = test_client("http://127.0.0.1:9/v1/proc:process".to_string());
        let error = client
            .process(b"doc bytes", DocumentMime::Jpeg, "test-token")
            .await
            .expect_err("connection failure");

        assert!(matches!(error, DocAiError::Connection(_)));
    }
}
