use crate::backend::make_reporter_from_config;
use crate::env::backend_config_from_env;
use crate::noop_reporter::NoopReporter;
use crate::reporter::ErrorReporter;
use std::sync::{Arc, OnceLock};

static GLOBAL_REPORTER: OnceLock<Arc<dyn ErrorReporter>> = OnceLock::new();

/// Error returned when the process-wide reporter was already initialized.
#[derive(thiserror::Error, Debug)]
pub enum GlobalReporterError {
    #[error("a global error reporter is already set")]
    AlreadySet,
}

/// Install the process-wide reporter.
///
/// Must run before the first call to [`error_reporter`]; afterwards the
/// handle is fixed for the life of the process.
pub fn set_error_reporter(reporter: Arc<dyn ErrorReporter>) -> Result<(), GlobalReporterError> {
    GLOBAL_REPORTER
        .set(reporter)
        .map_err(|_| GlobalReporterError::AlreadySet)
}

/// Process-wide reporter, initialized on first use.
///
/// Uses the handle given to [`set_error_reporter`] if any, otherwise builds
/// one from the `APM_ERRORS_DSN` environment. Falls back to
/// [`NoopReporter`] when nothing is configured or the configuration is
/// unusable.
pub fn error_reporter() -> Arc<dyn ErrorReporter> {
    GLOBAL_REPORTER.get_or_init(reporter_from_env).clone()
}

fn reporter_from_env() -> Arc<dyn ErrorReporter> {
    let cfg = match backend_config_from_env() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => return Arc::new(NoopReporter),
        Err(e) => {
            eprintln!("invalid APM_ERRORS_DSN, error reports are disabled: {}", e);
            return Arc::new(NoopReporter);
        }
    };

    match make_reporter_from_config(&cfg) {
        Ok(reporter) => reporter,
        Err(e) => {
            eprintln!("failed to build error reporter, reports are disabled: {}", e);
            Arc::new(NoopReporter)
        }
    }
}
