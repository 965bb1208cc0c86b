//! How a batch run reports its progress.

use std::sync::Arc;

/// Progress sink for a batch of reports.
///
/// Updates may arrive from any worker task, so implementations are shared
/// behind an `Arc` and must be `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// Number of reports found, once listing is done.
    fn set_total(&self, total: u64);

    /// `delta` more reports finished, successfully or not.
    fn inc(&self, delta: u64);

    /// Outcome of the report that finished last.
    fn set_message(&self, msg: String);

    /// Final summary line.
    fn finish(&self, msg: String);
}

/// Progress sink for tests and non-interactive runs.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
