use crate::record::{CustomParameters, ReportedError};

/// Destination for formatted error reports: the APM client's
/// notice-error operation.
///
/// Implementations wrap a concrete agent (an HTTP event API, stderr,
/// a test double). The adapter calls `notice_error` inline on the logging
/// thread and does not look at any result, so implementations that do I/O
/// should hand it off instead of blocking.
pub trait ErrorReporter: Send + Sync {
    /// Report a single error.
    ///
    /// **Parameters**
    /// - `error`: normalized message and stack.
    /// - `custom_parameters`: string-safe metadata plus `logLevel`.
    fn notice_error(&self, error: &ReportedError, custom_parameters: &CustomParameters);
}
