use crate::record::{CustomParameters, ParamValue, ReportedError};
use crate::reporter::ErrorReporter;
use chrono::Utc;
use reqwest::Client;
use serde_json::{Map, Value};

/// Default `eventType` attached to every posted event.
pub const DEFAULT_EVENT_TYPE: &str = "LogError";

/// Configuration for [`HttpReporter`].
///
/// The reporter posts one JSON array per report to an event-ingest
/// endpoint in the style of APM "insert events" APIs.
#[derive(Clone, Debug)]
pub struct HttpReporterConfig {
    /// Full ingest URL, e.g. "https://insights-collector.example.com/v1/accounts/1/events"
    pub url: String,
    /// Sent as `X-Insert-Key` when present.
    pub api_key: Option<String>,
    pub service_name: Option<String>,
    pub event_type: String,
}

impl HttpReporterConfig {
    pub fn new(url: impl Into<String>) -> Self {
        HttpReporterConfig {
            url: url.into(),
            api_key: None,
            service_name: None,
            event_type: DEFAULT_EVENT_TYPE.to_string(),
        }
    }
}

/// [`ErrorReporter`] that ships each report to an HTTP event API.
///
/// `notice_error` never blocks: the request runs on a task spawned on the
/// current tokio runtime. Failed requests are written to stderr and not
/// retried.
#[derive(Clone)]
pub struct HttpReporter {
    client: Client,
    config: HttpReporterConfig,
}

impl HttpReporter {
    /// Construct a new reporter using the provided configuration.
    ///
    /// **Parameters**
    /// - `config`: [`HttpReporterConfig`] describing the target URL and
    ///   optional credentials.
    ///
    /// **Returns**
    /// - A ready-to-use [`HttpReporter`] that can be passed as
    ///   `AdapterOptions::error_reporter` or installed globally.
    pub fn new(config: HttpReporterConfig) -> Self {
        let client = Client::new();
        Self { client, config }
    }

    pub fn config(&self) -> &HttpReporterConfig {
        &self.config
    }

    /// Build the JSON body for a single report.
    pub fn build_payload(&self, error: &ReportedError, custom_parameters: &CustomParameters) -> Value {
        let mut event = Map::new();

        // Custom parameters go in first so the reserved keys below win.
        for (key, value) in custom_parameters {
            event.insert(key.clone(), param_to_json(value));
        }

        event.insert("eventType".to_string(), Value::from(self.config.event_type.clone()));
        event.insert("timestamp".to_string(), Value::from(Utc::now().timestamp_millis()));
        if let Some(service) = &self.config.service_name {
            event.insert("service.name".to_string(), Value::from(service.clone()));
        }
        event.insert("error.message".to_string(), Value::from(error.message.clone()));
        event.insert("error.stack".to_string(), Value::from(error.stack.clone()));

        Value::Array(vec![Value::Object(event)])
    }
}

fn param_to_json(value: &ParamValue) -> Value {
    match value {
        ParamValue::Null => Value::Null,
        ParamValue::Bool(b) => Value::Bool(*b),
        ParamValue::Number(n) => Value::Number(n.clone()),
        ParamValue::Str(s) => Value::String(s.clone()),
    }
}

impl ErrorReporter for HttpReporter {
    fn notice_error(&self, error: &ReportedError, custom_parameters: &CustomParameters) {
        let body = self.build_payload(error, custom_parameters);

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                eprintln!("no tokio runtime available, dropping error report");
                return;
            }
        };

        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("X-Insert-Key", key);
        }

        handle.spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
                    eprintln!("error report rejected with status {}: {}", status, text);
                }
                Err(e) => eprintln!("error sending error report: {}", e),
            }
        });
    }
}
