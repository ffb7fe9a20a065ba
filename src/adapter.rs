use crate::format::format_report;
use crate::global;
use crate::record::{LogMessage, Metadata};
use crate::reporter::ErrorReporter;
use crate::transport::{DoneCallback, MetaArg, Transport};
use std::fmt;
use std::sync::Arc;

/// Level used when [`AdapterOptions::level`] is not set.
pub const DEFAULT_LEVEL: &str = "error";

/// Construction options for [`LogAdapter`].
///
/// **Fields**
/// - `level`: least severe level the host should forward; defaults to
///   [`DEFAULT_LEVEL`].
/// - `error_reporter`: explicit APM client handle. When absent the adapter
///   resolves the process-wide one once, at construction.
#[derive(Clone, Default)]
pub struct AdapterOptions {
    pub level: Option<String>,
    pub error_reporter: Option<Arc<dyn ErrorReporter>>,
}

impl AdapterOptions {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = Some(reporter);
        self
    }
}

impl fmt::Debug for AdapterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterOptions")
            .field("level", &self.level)
            .field("error_reporter", &self.error_reporter.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Transport that formats each log event into an error report and hands
/// it to an [`ErrorReporter`].
///
/// Every call is independent: nothing is carried between calls apart from
/// the reporter handle resolved at construction.
pub struct LogAdapter {
    level: String,
    reporter: Arc<dyn ErrorReporter>,
}

impl LogAdapter {
    /// Name reported through [`Transport::name`].
    pub const NAME: &'static str = "tracing-apm-errors";

    /// Build an adapter, falling back to [`global::error_reporter`] when no
    /// reporter is injected.
    pub fn new(options: AdapterOptions) -> Self {
        Self::with_resolver(options, global::error_reporter)
    }

    /// Build an adapter with a custom default-resolution strategy.
    ///
    /// `resolve` runs at most once, and only when `options` carries no
    /// reporter.
    pub fn with_resolver<F>(options: AdapterOptions, resolve: F) -> Self
    where
        F: FnOnce() -> Arc<dyn ErrorReporter>,
    {
        let reporter = match options.error_reporter {
            Some(reporter) => reporter,
            None => resolve(),
        };

        LogAdapter {
            level: options.level.unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            reporter,
        }
    }

    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.reporter
    }

    /// Format and forward one event, then signal completion.
    ///
    /// A callback passed in the metadata slot is used as the completion
    /// callback when `done` is empty; metadata is then treated as absent.
    /// The event is forwarded whatever its level.
    pub fn log(
        &self,
        level: &str,
        message: impl Into<LogMessage>,
        meta: Option<MetaArg>,
        done: Option<DoneCallback>,
    ) {
        let (metadata, done) = normalize_args(meta, done);
        let message = message.into();

        let report = format_report(level, &message, metadata.as_ref());
        self.reporter
            .notice_error(&report.error, &report.custom_parameters);

        if let Some(done) = done {
            done(None, true);
        }
    }
}

fn normalize_args(
    meta: Option<MetaArg>,
    done: Option<DoneCallback>,
) -> (Option<Metadata>, Option<DoneCallback>) {
    match meta {
        Some(MetaArg::Fields(m)) => (Some(m), done),
        Some(MetaArg::Done(shifted)) => (None, done.or(Some(shifted))),
        None => (None, done),
    }
}

impl Transport for LogAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn level(&self) -> &str {
        &self.level
    }

    fn log(
        &self,
        level: &str,
        message: LogMessage,
        meta: Option<MetaArg>,
        done: Option<DoneCallback>,
    ) {
        LogAdapter::log(self, level, message, meta, done)
    }
}

impl fmt::Debug for LogAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogAdapter")
            .field("name", &Self::NAME)
            .field("level", &self.level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;
    use crate::record::{CustomParameters, ErrorValue, ParamValue, ReportedError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        calls: Mutex<Vec<(ReportedError, CustomParameters)>>,
    }

    impl RecordingReporter {
        fn calls(&self) -> Vec<(ReportedError, CustomParameters)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ErrorReporter for RecordingReporter {
        fn notice_error(&self, error: &ReportedError, custom_parameters: &CustomParameters) {
            self.calls
                .lock()
                .unwrap()
                .push((error.clone(), custom_parameters.clone()));
        }
    }

    fn adapter_with(reporter: &Arc<RecordingReporter>) -> LogAdapter {
        let options = AdapterOptions::default()
            .with_level("info")
            .with_reporter(reporter.clone());
        LogAdapter::with_resolver(options, || panic!("resolver must not run"))
    }

    fn counting_callback(counter: &Arc<Mutex<Vec<(bool, bool)>>>) -> DoneCallback {
        let counter = Arc::clone(counter);
        Box::new(move |err: Option<AdapterError>, ok: bool| {
            counter.lock().unwrap().push((err.is_none(), ok))
        })
    }

    #[test]
    fn name_is_constant() {
        let adapter = adapter_with(&Arc::new(RecordingReporter::default()));
        assert_eq!(Transport::name(&adapter), "tracing-apm-errors");
    }

    #[test]
    fn level_defaults_to_error() {
        let reporter: Arc<dyn ErrorReporter> = Arc::new(RecordingReporter::default());
        let adapter = LogAdapter::with_resolver(
            AdapterOptions::default().with_reporter(reporter),
            || unreachable!(),
        );
        assert_eq!(Transport::level(&adapter), "error");
    }

    #[test]
    fn level_follows_options() {
        let adapter = adapter_with(&Arc::new(RecordingReporter::default()));
        assert_eq!(Transport::level(&adapter), "info");
    }

    #[test]
    fn log_with_metadata_and_callback_reports_once() {
        let reporter = Arc::new(RecordingReporter::default());
        let adapter = adapter_with(&reporter);
        let done = Arc::new(Mutex::new(Vec::new()));

        adapter.log(
            "error",
            "oops",
            Some(Metadata::new().into()),
            Some(counting_callback(&done)),
        );

        let calls = reporter.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.message, "oops");
        assert_eq!(*done.lock().unwrap(), vec![(true, true)]);
    }

    #[test]
    fn callback_in_metadata_slot_is_shifted() {
        let reporter = Arc::new(RecordingReporter::default());
        let adapter = adapter_with(&reporter);
        let done = Arc::new(Mutex::new(Vec::new()));

        adapter.log(
            "error",
            "oops",
            Some(MetaArg::Done(counting_callback(&done))),
            None,
        );

        let calls = reporter.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 1);
        assert_eq!(calls[0].1.get("logLevel"), Some(&ParamValue::from("error")));
        assert_eq!(*done.lock().unwrap(), vec![(true, true)]);
    }

    #[test]
    fn explicit_callback_wins_over_shifted_one() {
        let reporter = Arc::new(RecordingReporter::default());
        let adapter = adapter_with(&reporter);
        let shifted = Arc::new(Mutex::new(Vec::new()));
        let explicit = Arc::new(Mutex::new(Vec::new()));

        adapter.log(
            "error",
            "oops",
            Some(MetaArg::Done(counting_callback(&shifted))),
            Some(counting_callback(&explicit)),
        );

        assert!(shifted.lock().unwrap().is_empty());
        assert_eq!(explicit.lock().unwrap().len(), 1);
        assert_eq!(reporter.calls().len(), 1);
    }

    #[test]
    fn log_without_callback_still_reports() {
        let reporter = Arc::new(RecordingReporter::default());
        let adapter = adapter_with(&reporter);

        adapter.log("warn", "careful", None, None);

        assert_eq!(reporter.calls().len(), 1);
    }

    #[test]
    fn non_error_levels_are_forwarded() {
        let reporter = Arc::new(RecordingReporter::default());
        let adapter = adapter_with(&reporter);

        adapter.log("debug", "chatty", None, None);

        let calls = reporter.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.get("logLevel"), Some(&ParamValue::from("debug")));
    }

    #[test]
    fn error_message_is_unwrapped() {
        let reporter = Arc::new(RecordingReporter::default());
        let adapter = adapter_with(&reporter);

        adapter.log(
            "error",
            ErrorValue::new("disk full").with_stack("at write()"),
            None,
            None,
        );

        let calls = reporter.calls();
        assert_eq!(calls[0].0.message, "disk full");
        assert_eq!(calls[0].0.stack, "at write()");
    }

    #[test]
    fn resolver_runs_once_and_handle_is_reused() {
        let reporter = Arc::new(RecordingReporter::default());
        let resolved = Arc::new(AtomicUsize::new(0));

        let adapter = {
            let reporter = Arc::clone(&reporter);
            let resolved = Arc::clone(&resolved);
            LogAdapter::with_resolver(AdapterOptions::default(), move || {
                resolved.fetch_add(1, Ordering::SeqCst);
                reporter as Arc<dyn ErrorReporter>
            })
        };

        adapter.log("error", "first", None, None);
        adapter.log("error", "second", None, None);

        assert_eq!(resolved.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.calls().len(), 2);
    }
}
