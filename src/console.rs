use crate::record::{CustomParameters, ReportedError};
use crate::reporter::ErrorReporter;
use chrono::Utc;
use serde::Serialize;

/// Reporter that prints each report as one JSON line on stderr.
///
/// Handy during local development when no APM agent is reachable.
#[derive(Clone, Debug, Default)]
pub struct ConsoleReporter;

#[derive(Serialize)]
struct ConsoleLine<'a> {
    timestamp: String,
    error: &'a ReportedError,
    custom_parameters: &'a CustomParameters,
}

impl ConsoleReporter {
    pub fn render_line(&self, error: &ReportedError, custom_parameters: &CustomParameters) -> String {
        let line = ConsoleLine {
            timestamp: Utc::now().to_rfc3339(),
            error,
            custom_parameters,
        };
        serde_json::to_string(&line).unwrap_or_else(|_| format!("{{\"error\":{:?}}}", error.message))
    }
}

impl ErrorReporter for ConsoleReporter {
    fn notice_error(&self, error: &ReportedError, custom_parameters: &CustomParameters) {
        eprintln!("{}", self.render_line(error, custom_parameters));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ParamValue;

    #[test]
    fn line_is_json() {
        let error = ReportedError {
            message: "boom".to_string(),
            stack: "at main".to_string(),
        };
        let mut params = CustomParameters::new();
        params.insert("logLevel".to_string(), ParamValue::from("warn"));

        let line = ConsoleReporter.render_line(&error, &params);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["error"]["message"], "boom");
        assert_eq!(parsed["custom_parameters"]["logLevel"], "warn");
        assert!(parsed["timestamp"].is_string());
    }
}
