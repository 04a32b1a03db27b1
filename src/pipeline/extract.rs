//! Pattern-based post-processing of provider-extracted text.
//!
//! The extractor runs a fixed set of [`RecordMatcher`]s against the full raw
//! text. Matchers are independent global scans tied to one loan-contract
//! document template; adding a record kind for a new template means adding a
//! matcher, not touching the pipeline.

use crate::pipeline::types::{
    IdentityRecord, LicenseRecord, OtherIdentityRecord, StructuredRecord,
};
use regex::Regex;
use thiserror::Error;

/// Fixed display title attached to every extracted contract body.
const CONTRACT_TITLE: &str = "Contrato de Empréstimo";

// Template markers from the loan-contract documents this service ingests.
const CONTRACT_PATTERN: &str =
    r"(?s)CONTRATO DE EMPRÉSTIMO COM GARANTIA FIDEJUSSÓRIA(.*?)ASSINATURA DO";
const REGISTRATION_PATTERN: &str = r"REGISTRO GERAL (\d{3}\.\d{3}\.\d{3})";
const LICENSE_PATTERN: &str = r"(?s)CARTEIRA DE IDENTIDADE(.*?)CPF";
const OTHER_IDENTITY_PATTERN: &str = r"(?s)Identidade \d.*?CPF";

/// Raised when a built-in pattern fails to compile at startup.
#[derive(Debug, Error)]
#[error("Failed to compile pattern for the {matcher} matcher: {source}")]
pub struct ExtractorInitError {
    matcher: &'static str,
    #[source]
    source: regex::Error,
}

/// A single pattern family applied against the full extracted text.
///
/// Zero matches is a valid outcome, not a failure; an `Err` means evaluation
/// itself broke and is folded into [`StructuredRecord::error`].
pub trait RecordMatcher: Send + Sync {
    /// Stable name used in logs when the matcher fails.
    fn name(&self) -> &'static str;

    /// Scan `text` and fold any found records into `record`.
    fn apply(&self, text: &str, record: &mut StructuredRecord) -> anyhow::Result<()>;
}

/// Pattern-matching engine producing a [`StructuredRecord`] from raw text.
pub struct StructuredExtractor {
    matchers: Vec<Box<dyn RecordMatcher>>,
}

impl StructuredExtractor {
    /// Build the extractor with the loan-contract template matchers.
    pub fn new() -> Result<Self, ExtractorInitError> {
        Ok(Self::with_matchers(vec![
            Box::new(ContractMatcher::new()?),
            Box::new(RegistrationMatcher::new()?),
            Box::new(LicenseMatcher::new()?),
            Box::new(OtherIdentityMatcher::new()?),
        ]))
    }

    /// Build an extractor over an explicit matcher set.
    pub fn with_matchers(matchers: Vec<Box<dyn RecordMatcher>>) -> Self {
        Self { matchers }
    }

    /// Run every matcher over `text`.
    ///
    /// Never fails: a matcher error resets the record to its empty defaults
    /// and surfaces the description in the `error` field.
    pub fn extract(&self, text: &str) -> StructuredRecord {
        let mut record = StructuredRecord::default();
        for matcher in &self.matchers {
            if let Err(err) = matcher.apply(text, &mut record) {
                tracing::error!(
                    matcher = matcher.name(),
                    error = %err,
                    "Pattern evaluation failed"
                );
                return StructuredRecord {
                    error: Some(err.to_string()),
                    ..StructuredRecord::default()
                };
            }
        }
        record
    }
}

fn compile(matcher: &'static str, pattern: &str) -> Result<Regex, ExtractorInitError> {
    Regex::new(pattern).map_err(|source| ExtractorInitError { matcher, source })
}

/// First span between the contract opening and closing markers; at most one.
struct ContractMatcher {
    pattern: Regex,
}

impl ContractMatcher {
    fn new() -> Result<Self, ExtractorInitError> {
        Ok(Self {
            pattern: compile("contract", CONTRACT_PATTERN)?,
        })
    }
}

impl RecordMatcher for ContractMatcher {
    fn name(&self) -> &'static str {
        "contract"
    }

    fn apply(&self, text: &str, record: &mut StructuredRecord) -> anyhow::Result<()> {
        if let Some(caps) = self.pattern.captures(text) {
            record.contract.title = Some(CONTRACT_TITLE.to_string());
            record.contract.body = Some(caps[1].trim().to_string());
        }
        Ok(())
    }
}

/// Every registration label followed by a strict 3.3.3-digit group.
struct RegistrationMatcher {
    pattern: Regex,
}

impl RegistrationMatcher {
    fn new() -> Result<Self, ExtractorInitError> {
        Ok(Self {
            pattern: compile("registration", REGISTRATION_PATTERN)?,
        })
    }
}

impl RecordMatcher for RegistrationMatcher {
    fn name(&self) -> &'static str {
        "registration"
    }

    fn apply(&self, text: &str, record: &mut StructuredRecord) -> anyhow::Result<()> {
        for caps in self.pattern.captures_iter(text) {
            record.identity_records.push(IdentityRecord {
                registration_number: caps[1].to_string(),
            });
        }
        Ok(())
    }
}

/// Every card-label span, stopping at the nearest CPF terminator.
struct LicenseMatcher {
    pattern: Regex,
}

impl LicenseMatcher {
    fn new() -> Result<Self, ExtractorInitError> {
        Ok(Self {
            pattern: compile("license", LICENSE_PATTERN)?,
        })
    }
}

impl RecordMatcher for LicenseMatcher {
    fn name(&self) -> &'static str {
        "license"
    }

    fn apply(&self, text: &str, record: &mut StructuredRecord) -> anyhow::Result<()> {
        for caps in self.pattern.captures_iter(text) {
            record.license_records.push(LicenseRecord {
                info: caps[1].trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Every numbered identity span, whole match kept, stopping at the nearest CPF.
struct OtherIdentityMatcher {
    pattern: Regex,
}

impl OtherIdentityMatcher {
    fn new() -> Result<Self, ExtractorInitError> {
        Ok(Self {
            pattern: compile("other-identity", OTHER_IDENTITY_PATTERN)?,
        })
    }
}

impl RecordMatcher for OtherIdentityMatcher {
    fn name(&self) -> &'static str {
        "other-identity"
    }

    fn apply(&self, text: &str, record: &mut StructuredRecord) -> anyhow::Result<()> {
        for found in self.pattern.find_iter(text) {
            record.other_identity_records.push(OtherIdentityRecord {
                info: found.as_str().trim().to_string(),
            });
        }
        Ok(())
    }
}
