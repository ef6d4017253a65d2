use crate::tagging::Verdict;

/// Trait for reporting run progress.
///
/// CLI implements with indicatif; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_session_start(&self, _session: &str, _index: usize, _total: usize) {}
    fn on_session_complete(&self, _session: &str) {}
    fn on_verdict(&self, _session: &str, _tag: &str, _verdict: Verdict) {}
    fn on_field_written(&self, _session: &str, _scan: &str, _field: &str, _value: &str) {}
    fn on_run_complete(&self, _sessions: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
