//! Shared types for the Document AI transport.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors returned while invoking Document AI.
#[derive(Debug, Error)]
pub enum DocAiError {
    /// Provider answered with a non-success status.
    #[error("Document AI rejected the request ({status}): {body}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The request was sent but no usable response came back.
    #[error("Failed to reach Document AI: {0}")]
    Connection(#[source] reqwest::Error),
    /// The request could not be constructed or dispatched.
    #[error("Failed to build the Document AI request: {0}")]
    Request(#[source] reqwest::Error),
}

/// Supported document MIME types, derived from the upload's filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentMime {
    /// `application/pdf`
    Pdf,
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
}

impl DocumentMime {
    /// Render the wire MIME string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Resolve a document type from a filename's extension, case-insensitively.
    ///
    /// Filenames without a recognized extension resolve to `None` and are
    /// reported to the caller as unsupported, never treated as a fault.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request envelope for the `:process` call. Built once per request, never mutated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessRequest {
    pub(crate) raw_document: RawDocument,
}

/// Inline document payload: base64 content plus its MIME type.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDocument {
    pub(crate) content: String,
    pub(crate) mime_type: String,
}

/// Response envelope returned by a successful `:process` call.
#[derive(Debug, Deserialize)]
pub struct ProcessResponse {
    /// Full provider document object; passed through verbatim on the raw endpoint.
    #[serde(default)]
    pub document: Value,
}

impl ProcessResponse {
    /// Plain text extracted by the provider, when present.
    pub fn text(&self) -> Option<&str> {
        self.document.get("text").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_supported_extensions_case_insensitively() {
        assert_eq!(DocumentMime::from_filename("a.pdf"), Some(DocumentMime::Pdf));
        assert_eq!(DocumentMime::from_filename("scan.PNG"), Some(DocumentMime::Png));
        assert_eq!(DocumentMime::from_filename("photo.jpg"), Some(DocumentMime::Jpeg));
        assert_eq!(
            DocumentMime::from_filename("photo.JpEg"),
            Some(DocumentMime::Jpeg)
        );
        assert_eq!(
            DocumentMime::from_filename("archive.2024.Pdf"),
            Some(DocumentMime::Pdf)
        );
    }

    #[test]
    fn rejects_unknown_or_missing_extensions() {
        assert_eq!(DocumentMime::from_filename("notes.txt"), None);
        assert_eq!(DocumentMime::from_filename("contract"), None);
        assert_eq!(DocumentMime::from_filename(""), None);
        assert_eq!(DocumentMime::from_filename("weird.pdf.exe"), None);
    }

    #[test]
    fn renders_wire_mime_strings() {
        assert_eq!(DocumentMime::Pdf.as_str(), "application/pdf");
        assert_eq!(DocumentMime::Png.as_str(), "image/png");
        assert_eq!(DocumentMime::Jpeg.as_str(), "image/jpeg");
    }

    #[test]
    fn response_text_reads_the_document_text_field() {
        let response: ProcessResponse =
            serde_json::from_value(serde_json::json!({"document": {"text": "hello"}}))
                .expect("response");
        assert_eq!(response.text(), Some("hello"));

        let empty: ProcessResponse =
            serde_json::from_value(serde_json::json!({"document": {"pages": []}}))
                .expect("response");
        assert_eq!(empty.text(), None);
    }
}
