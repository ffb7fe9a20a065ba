use crate::backend::{BackendBuildError, DsnError};

/// Error type handed to a transport completion callback.
///
/// [`LogAdapter`](crate::adapter::LogAdapter) always completes with `None`.
/// `Rejected` is reserved for other [`Transport`](crate::transport::Transport)
/// implementations whose reporter can refuse an entry; more variants may be
/// added.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AdapterError {
    #[error("error reporter rejected the entry: {0}")]
    Rejected(String),
}

/// Error type returned when configuration cannot be turned into a layer or
/// reporter.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown log level: {0:?}")]
    UnknownLevel(String),

    #[error(transparent)]
    Dsn(#[from] DsnError),

    #[error(transparent)]
    Backend(#[from] BackendBuildError),
}

/// Error type returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to set global subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_names_the_reason() {
        let err = AdapterError::Rejected("quota exceeded".to_string());
        assert_eq!(err.to_string(), "error reporter rejected the entry: quota exceeded");
    }
}
