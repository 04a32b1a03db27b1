//! Extraction pipeline: upload typing, provider invocation, and pattern post-processing.

pub mod extract;
mod service;
pub mod types;

pub use extract::{ExtractorInitError, RecordMatcher, StructuredExtractor};
pub use service::{PipelineApi, PipelineService};
pub use types::{
    Contract, IdentityRecord, LicenseRecord, OtherIdentityRecord, PipelineError, StructuredRecord,
};
