use crate::record::{CustomParameters, ReportedError};
use crate::reporter::ErrorReporter;

/// A reporter that drops every report.
///
/// Used as the process-wide default when no APM backend is configured, and
/// for measuring the overhead of the layer without any I/O.
#[derive(Clone, Debug, Default)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn notice_error(&self, _error: &ReportedError, _custom_parameters: &CustomParameters) {}
}
