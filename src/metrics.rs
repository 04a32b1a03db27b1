use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing intake activity.
#[derive(Default)]
pub struct IngestMetrics {
    documents_processed: AtomicU64,
    provider_failures: AtomicU64,
    last_document_bytes: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one document successfully sent through the extraction provider.
    pub fn record_document(&self, size_bytes: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.last_document_bytes.store(size_bytes, Ordering::Relaxed);
    }

    /// Record a failed extraction provider call.
    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let documents_processed = self.documents_processed.load(Ordering::Relaxed);
        MetricsSnapshot {
            documents_processed,
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            last_document_bytes: (documents_processed > 0)
                .then(|| self.last_document_bytes.load(Ordering::Relaxed)),
        }
    }
}

/// Immutable view of intake counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents processed by the provider since startup.
    pub documents_processed: u64,
    /// Number of provider calls that ended in an error since startup.
    pub provider_failures: u64,
    /// Size of the most recently processed document, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_document_bytes: Option<u64>,
}
