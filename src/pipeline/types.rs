//! Core data types and error definitions for the extraction pipeline.

use crate::{auth::AuthError, docai::DocAiError};
use serde::Serialize;
use thiserror::Error;

/// Errors emitted by the document extraction pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The upload's filename does not map to a supported document type.
    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),
    /// The stored upload could not be read back from disk.
    #[error("Failed to read stored upload: {0}")]
    StorageRead(#[source] std::io::Error),
    /// The credential collaborator failed to produce a bearer token.
    #[error("Credential acquisition failed: {0}")]
    Credential(#[from] AuthError),
    /// The extraction provider call failed.
    #[error("Document AI request failed: {0}")]
    DocAi(#[from] DocAiError),
}

/// Structured record assembled from one document's extracted text.
///
/// Every field other than `error` defaults to empty; zero matches for a
/// pattern family is a valid outcome and leaves that family's sequence empty.
/// `error` is populated only when pattern evaluation itself failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRecord {
    /// Loan contract span; stays empty when the marker pair is absent.
    pub contract: Contract,
    /// General-registration numbers in encounter order, duplicates preserved.
    pub identity_records: Vec<IdentityRecord>,
    /// Identity-card spans, each ending at the nearest CPF marker.
    pub license_records: Vec<LicenseRecord>,
    /// Numbered identity spans, each ending at the nearest CPF marker.
    pub other_identity_records: Vec<OtherIdentityRecord>,
    /// Description of a pattern-evaluation failure, absent when matching completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Contract title and body; both absent until the contract matcher finds a span.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contract {
    /// Fixed display title attached to an extracted contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Trimmed text between the opening and closing contract markers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Contract {
    /// Whether the contract matcher found a span.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

/// One general-registration number found in the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// Registration number exactly as matched, dots preserved.
    pub registration_number: String,
}

/// One identity-card span found in the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenseRecord {
    /// Trimmed text between the card label and the nearest CPF marker.
    pub info: String,
}

/// One numbered identity span found in the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherIdentityRecord {
    /// Entire matched span, trimmed, label and terminator included.
    pub info: String,
}
