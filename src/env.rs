//! Environment variable names used by this crate for convenient
//! configuration from services.
//!
//! These are purely helpers; the adapter and formatter never read the
//! environment themselves.

use crate::adapter::{AdapterOptions, DEFAULT_LEVEL};
use crate::backend::{parse_dsn, BackendConfig, DsnError};

/// Least severe level forwarded to the APM backend, e.g. `error` or `warn`.
pub const APM_ERRORS_LEVEL_ENV: &str = "APM_ERRORS_LEVEL";

/// DSN selecting the process-wide reporter, e.g. `https://collector/events`.
pub const APM_ERRORS_DSN_ENV: &str = "APM_ERRORS_DSN";

/// Optional API key sent with HTTP reports.
pub const APM_ERRORS_API_KEY_ENV: &str = "APM_ERRORS_API_KEY";

/// Optional logical service name attached to HTTP reports.
pub const APM_ERRORS_SERVICE_NAME_ENV: &str = "APM_ERRORS_SERVICE_NAME";

/// Optional `eventType` override for HTTP reports.
pub const APM_ERRORS_EVENT_TYPE_ENV: &str = "APM_ERRORS_EVENT_TYPE";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AdapterOptions {
    /// Options with `level` taken from [`APM_ERRORS_LEVEL_ENV`], falling
    /// back to [`DEFAULT_LEVEL`]. The reporter is left to default resolution.
    pub fn from_env() -> Self {
        AdapterOptions {
            level: Some(env_or(APM_ERRORS_LEVEL_ENV, DEFAULT_LEVEL)),
            error_reporter: None,
        }
    }
}

/// Backend configuration from [`APM_ERRORS_DSN_ENV`] and its companion
/// variables.
///
/// **Returns**
/// - `Ok(None)` if no DSN is set.
/// - `Err(..)` if the DSN has an unsupported scheme.
pub fn backend_config_from_env() -> Result<Option<BackendConfig>, DsnError> {
    let dsn = match env_opt(APM_ERRORS_DSN_ENV) {
        Some(dsn) => dsn,
        None => return Ok(None),
    };

    let mut cfg = parse_dsn(&dsn)?;
    cfg.api_key = env_opt(APM_ERRORS_API_KEY_ENV);
    cfg.service_name = env_opt(APM_ERRORS_SERVICE_NAME_ENV);
    cfg.event_type = env_opt(APM_ERRORS_EVENT_TYPE_ENV);
    Ok(Some(cfg))
}
