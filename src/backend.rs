use std::sync::Arc;

use crate::noop_reporter::NoopReporter;
use crate::reporter::ErrorReporter;

/// Supported reporter kinds that can be selected via DSN or config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Http,
    Console,
    Noop,
}

/// High-level backend configuration built from a DSN.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Selected reporter implementation.
    pub kind: BackendKind,
    /// Raw DSN that was used to construct this config.
    pub dsn: String,
    pub api_key: Option<String>,
    pub service_name: Option<String>,
    pub event_type: Option<String>,
}

impl BackendConfig {
    pub fn new(kind: BackendKind, dsn: impl Into<String>) -> Self {
        BackendConfig {
            kind,
            dsn: dsn.into(),
            api_key: None,
            service_name: None,
            event_type: None,
        }
    }
}

/// Parse a DSN string and infer the backend kind from its scheme.
///
/// Examples:
/// - "https://insights-collector.example.com/v1/accounts/1/events"
/// - "console://" or "stderr://"
/// - "noop://"
pub fn parse_dsn(dsn: &str) -> Result<BackendConfig, DsnError> {
    let dsn = dsn.trim();
    let lower = dsn.to_ascii_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(BackendConfig::new(BackendKind::Http, dsn))
    } else if lower.starts_with("console://") || lower.starts_with("stderr://") {
        Ok(BackendConfig::new(BackendKind::Console, dsn))
    } else if lower.starts_with("noop://") {
        Ok(BackendConfig::new(BackendKind::Noop, dsn))
    } else {
        Err(DsnError::UnknownScheme)
    }
}

/// Error type returned when parsing a DSN.
#[derive(thiserror::Error, Debug)]
pub enum DsnError {
    #[error("unknown or unsupported DSN scheme")]
    UnknownScheme,
}

/// Error type returned when building a reporter from configuration.
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error("feature `{feature}` is required for {kind:?} backend")]
    FeatureDisabled {
        kind: BackendKind,
        feature: &'static str,
    },
}

/// Create a concrete [`ErrorReporter`] from a [`BackendConfig`].
///
/// This is the entry point for applications that select the APM backend
/// with a single DSN string instead of constructing reporters manually.
pub fn make_reporter_from_config(
    cfg: &BackendConfig,
) -> Result<Arc<dyn ErrorReporter>, BackendBuildError> {
    match cfg.kind {
        BackendKind::Http => {
            #[cfg(feature = "http")]
            {
                use crate::http::{HttpReporter, HttpReporterConfig};

                let mut config = HttpReporterConfig::new(cfg.dsn.clone());
                config.api_key = cfg.api_key.clone();
                config.service_name = cfg.service_name.clone();
                if let Some(event_type) = &cfg.event_type {
                    config.event_type = event_type.clone();
                }

                Ok(Arc::new(HttpReporter::new(config)) as Arc<dyn ErrorReporter>)
            }

            #[cfg(not(feature = "http"))]
            {
                Err(BackendBuildError::FeatureDisabled {
                    kind: cfg.kind,
                    feature: "http",
                })
            }
        }
        BackendKind::Console => {
            #[cfg(feature = "console")]
            {
                use crate::console::ConsoleReporter;

                Ok(Arc::new(ConsoleReporter) as Arc<dyn ErrorReporter>)
            }

            #[cfg(not(feature = "console"))]
            {
                Err(BackendBuildError::FeatureDisabled {
                    kind: cfg.kind,
                    feature: "console",
                })
            }
        }
        BackendKind::Noop => Ok(Arc::new(NoopReporter) as Arc<dyn ErrorReporter>),
    }
}
