use crate::error::ConfigError;
use crate::record::{ErrorValue, LogMessage, MetaValue, Metadata};
use crate::transport::{MetaArg, Transport};
use std::str::FromStr;
use std::sync::{atomic::{AtomicU64, Ordering}, Arc};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that hands events at or above the transport's
/// level to a [`Transport`].
///
/// With the default `error` level only `ERROR` events reach the APM
/// backend. Forwarding happens inline on the thread that emitted the event.
pub struct ApmErrorLayer {
    transport: Arc<dyn Transport>,
    threshold: Level,
    include_source_location: bool,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events handed to the transport.
    pub forwarded_events: Arc<AtomicU64>,
}

impl ApmErrorLayer {
    /// Create a new layer around `transport`.
    ///
    /// Fails if the transport's level is not one of `error`, `warn`,
    /// `info`, `debug` or `trace`.
    pub fn new(transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        let threshold = parse_level(transport.level())?;
        Ok(Self {
            transport,
            threshold,
            include_source_location: true,
            total_events: Arc::new(AtomicU64::new(0)),
            forwarded_events: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Whether `target`, `module_path`, `file` and `line` are added to the
    /// metadata of forwarded events.
    pub fn with_source_location(mut self, enabled: bool) -> Self {
        self.include_source_location = enabled;
        self
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }
}

/// Parse a level name, case-insensitively.
pub fn parse_level(level: &str) -> Result<Level, ConfigError> {
    Level::from_str(level.trim()).map_err(|_| ConfigError::UnknownLevel(level.to_string()))
}

/// Targets whose events come from reporting itself. Forwarding them would
/// make every report trigger another one.
const REPORTER_INTERNAL_TARGETS: &[&str] = &[
    env!("CARGO_CRATE_NAME"),
    "reqwest",
    "hyper",
    "h2",
    "rustls",
];

fn is_reporter_internal(target: &str) -> bool {
    REPORTER_INTERNAL_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
    })
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        Level::DEBUG => "debug",
        _ => "trace",
    }
}

impl<S> Layer<S> for ApmErrorLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if *event.metadata().level() > self.threshold {
            return;
        }
        if is_reporter_internal(event.metadata().target()) {
            return;
        }

        let mut fields = Metadata::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let meta = event.metadata();
        if self.include_source_location {
            fields
                .entry("target".to_string())
                .or_insert_with(|| MetaValue::from(meta.target()));
            if let Some(module_path) = meta.module_path() {
                fields
                    .entry("module_path".to_string())
                    .or_insert_with(|| MetaValue::from(module_path));
            }
            if let Some(file) = meta.file() {
                fields
                    .entry("file".to_string())
                    .or_insert_with(|| MetaValue::from(file));
            }
            if let Some(line) = meta.line() {
                fields
                    .entry("line".to_string())
                    .or_insert_with(|| MetaValue::from(line as u64));
            }
        }

        // `error!(error = &err as &dyn Error)` with no message reports the
        // error itself.
        let message = match message {
            Some(text) => LogMessage::Text(text),
            None => match fields.get("error").and_then(MetaValue::as_error) {
                Some(err) => LogMessage::Error(err.clone()),
                None => LogMessage::Text(String::new()),
            },
        };

        self.forwarded_events.fetch_add(1, Ordering::Relaxed);
        self.transport
            .log(level_name(meta.level()), message, Some(MetaArg::Fields(fields)), None);
    }
}

use tracing::field::{Field, Visit};

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Metadata,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), MetaValue::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), MetaValue::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), MetaValue::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), MetaValue::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), MetaValue::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(
            field.name().to_string(),
            MetaValue::Error(ErrorValue::from_error(value)),
        );
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), MetaValue::Str(format!("{:?}", value)));
        }
    }
}
