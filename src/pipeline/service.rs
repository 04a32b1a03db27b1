//! Pipeline service coordinating upload typing, provider calls, and post-processing.

use crate::{
    auth::{AccessTokenProvider, GoogleTokenProvider},
    docai::{DocAiClient, DocumentMime, ProcessResponse},
    metrics::{IngestMetrics, MetricsSnapshot},
    pipeline::{
        extract::StructuredExtractor,
        types::{PipelineError, StructuredRecord},
    },
    storage::StoredUpload,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Coordinates the full extraction pipeline: upload typing, credential
/// acquisition, the provider call, and structured post-processing.
///
/// The service owns long-lived handles to the token source, the Document AI
/// transport, and the compiled matchers, so every request reuses the same
/// components. Construct it once near process start and share it through an
/// `Arc`.
pub struct PipelineService {
    token_provider: Box<dyn AccessTokenProvider>,
    docai: DocAiClient,
    extractor: StructuredExtractor,
    metrics: Arc<IngestMetrics>,
}

/// Abstraction over the pipeline used by the HTTP surface.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Run the structured flow: resolve the document type from the filename,
    /// extract text remotely, and match record patterns over it.
    async fn process_document(
        &self,
        upload: StoredUpload,
    ) -> Result<StructuredRecord, PipelineError>;

    /// Run the raw flow: treat the upload as a PDF regardless of filename and
    /// return the provider's document object verbatim.
    async fn process_pdf(&self, upload: StoredUpload) -> Result<Value, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PipelineService {
    /// Build a new pipeline service, initializing backing collaborators.
    pub async fn new() -> Self {
        tracing::info!("Initializing credential source");
        let token_provider = GoogleTokenProvider::new()
            .await
            .expect("Failed to resolve Google credentials");
        let docai = DocAiClient::from_config().expect("Failed to initialize Document AI client");
        let extractor = StructuredExtractor::new().expect("Failed to compile extraction patterns");
        Self::with_components(Box::new(token_provider), docai, extractor)
    }

    /// Assemble a service from explicit collaborators.
    pub fn with_components(
        token_provider: Box<dyn AccessTokenProvider>,
        docai: DocAiClient,
        extractor: StructuredExtractor,
    ) -> Self {
        Self {
            token_provider,
            docai,
            extractor,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Structured flow: type the upload, extract, and pattern-match.
    pub async fn process_document(
        &self,
        upload: StoredUpload,
    ) -> Result<StructuredRecord, PipelineError> {
        let mime = DocumentMime::from_filename(upload.original_name()).ok_or_else(|| {
            PipelineError::UnsupportedType(upload.original_name().to_string())
        })?;
        let response = self.run_extraction(upload, mime).await?;

        let text = response.text().unwrap_or_default();
        let record = self.extractor.extract(text);
        tracing::info!(
            text_len = text.len(),
            identity_records = record.identity_records.len(),
            license_records = record.license_records.len(),
            other_identity_records = record.other_identity_records.len(),
            contract_found = !record.contract.is_empty(),
            pattern_error = record.error.is_some(),
            "Document processed"
        );
        Ok(record)
    }

    /// Raw flow: hard-wired to PDF, provider document returned unmodified.
    pub async fn process_pdf(&self, upload: StoredUpload) -> Result<Value, PipelineError> {
        let response = self.run_extraction(upload, DocumentMime::Pdf).await?;
        tracing::info!("PDF processed");
        Ok(response.document)
    }

    /// Shared request flow for both endpoint variants.
    ///
    /// Takes ownership of the upload: its backing file is removed when the
    /// handle drops here, on success and on every early return alike.
    async fn run_extraction(
        &self,
        upload: StoredUpload,
        mime: DocumentMime,
    ) -> Result<ProcessResponse, PipelineError> {
        tracing::info!(
            filename = %upload.original_name(),
            size = upload.size_bytes(),
            mime = %mime,
            "Dispatching document to extraction provider"
        );
        let bytes = tokio::fs::read(upload.path())
            .await
            .map_err(PipelineError::StorageRead)?;
        let token = self.token_provider.access_token().await?;

        let response = match self.docai.process(&bytes, mime, &token).await {
            Ok(response) => response,
            Err(err) => {
                self.metrics.record_provider_failure();
                return Err(err.into());
            }
        };

        self.metrics.record_document(bytes.len() as u64);
        Ok(response)
    }

    /// Return the current intake metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl PipelineApi for PipelineService {
    async fn process_document(
        &self,
        upload: StoredUpload,
    ) -> Result<StructuredRecord, PipelineError> {
        PipelineService::process_document(self, upload).await
    }

    async fn process_pdf(&self, upload: StoredUpload) -> Result<Value, PipelineError> {
        PipelineService::process_pdf(self, upload).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PipelineService::metrics_snapshot(self)
    }
}
