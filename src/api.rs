//! HTTP surface for Docintake.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /process-document` – Upload a loan document (pdf/png/jpeg), extract its text
//!   through the provider, and return the structured record produced by pattern matching.
//! - `POST /process-pdf` – Upload a PDF and return the provider's raw document object
//!   without post-processing.
//! - `GET /health` – Liveness probe.
//! - `GET /metrics` – Observe intake counters.
//!
//! Both upload endpoints accept a single multipart field named `document` and share one
//! pipeline flow, so cleanup and error mapping behave identically across variants.

use crate::docai::DocAiError;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::{PipelineApi, PipelineError, StructuredRecord};
use crate::storage::UploadStore;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Multipart field expected to carry the uploaded document.
const DOCUMENT_FIELD: &str = "document";

/// Upper bound on one upload request body.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Shared state handed to every handler.
pub struct AppState<S> {
    service: Arc<S>,
    store: UploadStore,
}

/// Build the HTTP router exposing the intake API surface.
pub fn create_router<S>(service: Arc<S>, store: UploadStore) -> Router
where
    S: PipelineApi + 'static,
{
    let state = Arc::new(AppState { service, store });
    Router::new()
        .route("/process-document", post(process_document::<S>))
        .route("/process-pdf", post(process_pdf::<S>))
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Process an upload through the structured extraction flow.
async fn process_document<S>(
    State(state): State<Arc<AppState<S>>>,
    multipart: Multipart,
) -> Result<Json<StructuredRecord>, AppError>
where
    S: PipelineApi,
{
    let (filename, bytes) = read_document_field(multipart).await?;
    tracing::info!(filename = %filename, size = bytes.len(), "Received document upload");
    let upload = state
        .store
        .save(&filename, &bytes)
        .await
        .map_err(AppError::Store)?;
    let record = state.service.process_document(upload).await?;
    Ok(Json(record))
}

/// Process an upload through the raw PDF flow.
async fn process_pdf<S>(
    State(state): State<Arc<AppState<S>>>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError>
where
    S: PipelineApi,
{
    let (filename, bytes) = read_document_field(multipart).await?;
    tracing::info!(filename = %filename, size = bytes.len(), "Received PDF upload");
    let upload = state
        .store
        .save(&filename, &bytes)
        .await
        .map_err(AppError::Store)?;
    let document = state.service.process_pdf(upload).await?;
    Ok(Json(document))
}

/// Pull the document field out of the multipart stream.
async fn read_document_field(mut multipart: Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(AppError::Multipart)? {
        if field.name() != Some(DOCUMENT_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(AppError::Multipart)?;
        return Ok((filename, bytes));
    }
    Err(AppError::MissingFile)
}

/// Response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Liveness probe.
async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Return a concise metrics snapshot with intake counters.
async fn get_metrics<S>(State(state): State<Arc<AppState<S>>>) -> Json<MetricsSnapshot>
where
    S: PipelineApi,
{
    Json(state.service.metrics_snapshot())
}

/// Outward error surface for the HTTP handlers.
enum AppError {
    /// The request carried no document field.
    MissingFile,
    /// The multipart stream could not be read.
    Multipart(MultipartError),
    /// The upload could not be written to temporary storage.
    Store(std::io::Error),
    /// The pipeline reported a classified failure.
    Pipeline(PipelineError),
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self::Pipeline(inner)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingFile => {
                (StatusCode::BAD_REQUEST, "No file was uploaded.".to_string()).into_response()
            }
            Self::Multipart(err) => {
                tracing::warn!(error = %err, "Malformed multipart upload");
                (StatusCode::BAD_REQUEST, format!("Malformed upload: {err}")).into_response()
            }
            Self::Store(err) => {
                tracing::error!(error = %err, "Failed to store upload");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store the uploaded document.".to_string(),
                )
                    .into_response()
            }
            Self::Pipeline(PipelineError::UnsupportedType(filename)) => {
                tracing::warn!(filename = %filename, "Rejected unsupported file type");
                (StatusCode::BAD_REQUEST, "Unsupported file type.".to_string()).into_response()
            }
            // Provider rejections relay the provider's own status and payload verbatim.
            Self::Pipeline(PipelineError::DocAi(DocAiError::Rejected { status, body })) => {
                let status =
                    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, body).into_response()
            }
            Self::Pipeline(PipelineError::DocAi(DocAiError::Connection(err))) => {
                tracing::error!(error = %err, "Document AI connection failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to reach the document extraction service.".to_string(),
                )
                    .into_response()
            }
            Self::Pipeline(err) => {
                tracing::error!(error = %err, "Document processing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process the document.".to_string(),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::docai::DocAiError;
    use crate::metrics::MetricsSnapshot;
    use crate::pipeline::{
        IdentityRecord, PipelineApi, PipelineError, StructuredRecord,
    };
    use crate::storage::{StoredUpload, UploadStore};
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    fn multipart_request(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let boundary = "X-DOCINTAKE-BOUNDARY";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    struct StubPipeline {
        calls: Mutex<Vec<String>>,
        record: StructuredRecord,
        document: Value,
        failure: Option<Box<dyn Fn() -> PipelineError + Send + Sync>>,
    }

    impl StubPipeline {
        fn succeeding(record: StructuredRecord, document: Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                record,
                document,
                failure: None,
            }
        }

        fn failing(make: impl Fn() -> PipelineError + Send + Sync + 'static) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                record: StructuredRecord::default(),
                document: Value::Null,
                failure: Some(Box::new(make)),
            }
        }

        async fn recorded_calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl PipelineApi for StubPipeline {
        async fn process_document(
            &self,
            upload: StoredUpload,
        ) -> Result<StructuredRecord, PipelineError> {
            self.calls
                .lock()
                .await
                .push(upload.original_name().to_string());
            match &self.failure {
                Some(make) => Err(make()),
                None => Ok(self.record.clone()),
            }
        }

        async fn process_pdf(&self, upload: StoredUpload) -> Result<Value, PipelineError> {
            self.calls
                .lock()
                .await
                .push(upload.original_name().to_string());
            match &self.failure {
                Some(make) => Err(make()),
                None => Ok(self.document.clone()),
            }
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_processed: 7,
                provider_failures: 1,
                last_document_bytes: Some(42),
            }
        }
    }

    fn test_app(service: Arc<StubPipeline>) -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("temp dir");
        let app = create_router(service, UploadStore::new(dir.path()));
        (app, dir)
    }

    #[tokio::test]
    async fn missing_document_field_yields_bad_request() {
        let service = Arc::new(StubPipeline::succeeding(
            StructuredRecord::default(),
            Value::Null,
        ));
        let (app, _dir) = test_app(service.clone());

        let request = multipart_request("/process-document", "attachment", "a.pdf", b"pdf");
        let response = app.oneshot(request).await.expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn process_document_returns_the_structured_record() {
        let record = StructuredRecord {
            identity_records: vec![IdentityRecord {
                registration_number: "123.456.789".to_string(),
            }],
            ..StructuredRecord::default()
        };
        let service = Arc::new(StubPipeline::succeeding(record, Value::Null));
        let (app, _dir) = test_app(service.clone());

        let request = multipart_request("/process-document", "document", "contract.pdf", b"pdf");
        let response = app.oneshot(request).await.expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["identityRecords"][0]["registrationNumber"], "123.456.789");
        assert_eq!(json["contract"], json!({}));
        assert!(json.get("error").is_none());

        assert_eq!(service.recorded_calls().await, vec!["contract.pdf"]);
    }

    #[tokio::test]
    async fn process_pdf_passes_the_document_through() {
        let document = json!({"text": "raw", "pages": [{"pageNumber": 1}]});
        let service = Arc::new(StubPipeline::succeeding(
            StructuredRecord::default(),
            document.clone(),
        ));
        let (app, _dir) = test_app(service);

        let request = multipart_request("/process-pdf", "document", "anything.bin", b"pdf");
        let response = app.oneshot(request).await.expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json, document);
    }

    #[tokio::test]
    async fn unsupported_type_maps_to_bad_request() {
        let service = Arc::new(StubPipeline::failing(|| {
            PipelineError::UnsupportedType("notes.txt".to_string())
        }));
        let (app, _dir) = test_app(service);

        let request = multipart_request("/process-document", "document", "notes.txt", b"text");
        let response = app.oneshot(request).await.expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(body.as_ref(), b"Unsupported file type.");
    }

    #[tokio::test]
    async fn provider_rejection_passes_status_and_body_through() {
        let service = Arc::new(StubPipeline::failing(|| {
            PipelineError::DocAi(DocAiError::Rejected {
                status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                body: "quota exhausted".to_string(),
            })
        }));
        let (app, _dir) = test_app(service);

        let request = multipart_request("/process-document", "document", "contract.pdf", b"pdf");
        let response = app.oneshot(request).await.expect("router response");

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(body.as_ref(), b"quota exhausted");
    }

    #[tokio::test]
    async fn metrics_route_reports_the_snapshot() {
        let service = Arc::new(StubPipeline::succeeding(
            StructuredRecord::default(),
            Value::Null,
        ));
        let (app, _dir) = test_app(service);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/metrics")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["documents_processed"], 7);
        assert_eq!(json["provider_failures"], 1);
        assert_eq!(json["last_document_bytes"], 42);
    }

    #[tokio::test]
    async fn health_route_reports_healthy() {
        let service = Arc::new(StubPipeline::succeeding(
            StructuredRecord::default(),
            Value::Null,
        ));
        let (app, _dir) = test_app(service);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["status"], "healthy");
    }
}
