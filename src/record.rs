use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Metadata bag attached to a log event.
pub type Metadata = BTreeMap<String, MetaValue>;

/// Key/value tags forwarded to the APM client next to the reported error.
pub type CustomParameters = BTreeMap<String, ParamValue>;

/// Error-like value: something that carries a message and possibly a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorValue {
    pub name: Option<String>,
    pub message: String,
    pub stack: Option<String>,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorValue {
            name: None,
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture a Rust error. The message is its `Display` output followed by
    /// each `source()` in turn, joined with `": "`. Rust errors carry no
    /// stack of their own.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ErrorValue::new(message)
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// The message half of a log call: plain text or an error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMessage {
    Text(String),
    Error(ErrorValue),
}

impl LogMessage {
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            LogMessage::Error(e) => Some(e),
            LogMessage::Text(_) => None,
        }
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogMessage::Text(s) => f.write_str(s),
            LogMessage::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl From<&str> for LogMessage {
    fn from(s: &str) -> Self {
        LogMessage::Text(s.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(s: String) -> Self {
        LogMessage::Text(s)
    }
}

impl From<ErrorValue> for LogMessage {
    fn from(e: ErrorValue) -> Self {
        LogMessage::Error(e)
    }
}

/// A single metadata value, sorted into the kinds the formatter knows how
/// to coerce. Anything else should enter as `Str` via its `Display` or
/// `Debug` output.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Str(String),
    Error(ErrorValue),
    Function { name: Option<String> },
    Object(serde_json::Map<String, serde_json::Value>),
    Array(Vec<serde_json::Value>),
}

impl MetaValue {
    /// Describe a function or closure by its type name. Closures and
    /// function pointers have no usable name and are recorded as anonymous.
    pub fn function<F>(_f: &F) -> Self {
        let full = std::any::type_name::<F>();
        let name = if full.contains("{{closure}}") || full.starts_with("fn(") {
            None
        } else {
            // Generic arguments may contain `::` themselves.
            let path = full.split('<').next().unwrap_or(full);
            path.rsplit("::")
                .next()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        MetaValue::Function { name }
    }

    pub fn named_function(name: impl Into<String>) -> Self {
        MetaValue::Function {
            name: Some(name.into()),
        }
    }

    pub fn anonymous_function() -> Self {
        MetaValue::Function { name: None }
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            MetaValue::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Str(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Str(s)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

impl From<i64> for MetaValue {
    fn from(n: i64) -> Self {
        MetaValue::Number(n.into())
    }
}

impl From<u64> for MetaValue {
    fn from(n: u64) -> Self {
        MetaValue::Number(n.into())
    }
}

impl From<f64> for MetaValue {
    fn from(n: f64) -> Self {
        match serde_json::Number::from_f64(n) {
            Some(num) => MetaValue::Number(num),
            // NaN and infinities have no JSON number form.
            None => MetaValue::Str(n.to_string()),
        }
    }
}

impl From<ErrorValue> for MetaValue {
    fn from(e: ErrorValue) -> Self {
        MetaValue::Error(e)
    }
}

impl From<serde_json::Value> for MetaValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => MetaValue::Null,
            Value::Bool(b) => MetaValue::Bool(b),
            Value::Number(n) => MetaValue::Number(n),
            Value::String(s) => MetaValue::Str(s),
            Value::Array(a) => MetaValue::Array(a),
            Value::Object(o) => MetaValue::Object(o),
        }
    }
}

/// String-or-primitive value that is safe to hand to the APM client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Str(String),
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Number(n.into())
    }
}

/// Error payload handed to [`ErrorReporter::notice_error`](crate::reporter::ErrorReporter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    pub message: String,
    pub stack: String,
}

/// Result of formatting one log event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedReport {
    pub error: ReportedError,
    pub custom_parameters: CustomParameters,
}
