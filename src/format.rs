use crate::record::{
    CustomParameters, FormattedReport, LogMessage, MetaValue, Metadata, ParamValue, ReportedError,
};
use std::backtrace::Backtrace;

/// Key under which the event level is stored in the custom parameters.
pub const LOG_LEVEL_KEY: &str = "logLevel";

const STACK_KEY: &str = "stack";
const ERROR_KEY: &str = "error";

/// Normalize a log event into the payload the APM client expects.
///
/// **Parameters**
/// - `level`: level name of the event, copied into `logLevel`.
/// - `message`: text or error value; only this decides the reported
///   message, a `message` field in `metadata` does not.
/// - `metadata`: optional metadata bag.
///
/// **Returns**
/// - A fresh [`FormattedReport`] whose stack is always populated. The stack
///   comes from the message error, then `metadata.stack`, then
///   `metadata.error.stack`, and as a last resort is captured at the call
///   site.
pub fn format_report(
    level: &str,
    message: &LogMessage,
    metadata: Option<&Metadata>,
) -> FormattedReport {
    let mut reported_message = message.to_string();
    let mut stack: Option<String> = None;

    if let Some(err) = message.as_error() {
        reported_message = err.message.clone();
        stack = err.stack.clone().filter(|s| !s.is_empty());
    }

    let mut custom_parameters = CustomParameters::new();

    if let Some(meta) = metadata {
        if stack.is_none() {
            stack = metadata_stack(meta);
        }

        for (key, value) in meta {
            if key == STACK_KEY {
                continue;
            }
            custom_parameters.insert(key.clone(), coerce_value(value));
        }
    }

    let stack = stack.unwrap_or_else(capture_stack);

    custom_parameters.insert(LOG_LEVEL_KEY.to_string(), ParamValue::Str(level.to_string()));

    FormattedReport {
        error: ReportedError {
            message: reported_message,
            stack,
        },
        custom_parameters,
    }
}

fn metadata_stack(meta: &Metadata) -> Option<String> {
    if let Some(MetaValue::Str(s)) = meta.get(STACK_KEY) {
        if !s.is_empty() {
            return Some(s.clone());
        }
    }

    meta.get(ERROR_KEY)
        .and_then(MetaValue::as_error)
        .and_then(|e| e.stack.clone())
        .filter(|s| !s.is_empty())
}

/// Turn a metadata value into something the APM client can store.
///
/// Error values become their string form, functions a placeholder naming
/// them, objects and arrays a compact JSON string. Primitives pass
/// through unchanged.
pub fn coerce_value(value: &MetaValue) -> ParamValue {
    match value {
        MetaValue::Null => ParamValue::Null,
        MetaValue::Bool(b) => ParamValue::Bool(*b),
        MetaValue::Number(n) => ParamValue::Number(n.clone()),
        MetaValue::Str(s) => ParamValue::Str(s.clone()),
        MetaValue::Error(e) => ParamValue::Str(e.to_string()),
        MetaValue::Function { name: Some(name) } => ParamValue::Str(format!("[Function: {}]", name)),
        MetaValue::Function { name: None } => ParamValue::Str("[Function (anonymous)]".to_string()),
        MetaValue::Object(map) => ParamValue::Str(
            serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string()),
        ),
        MetaValue::Array(items) => ParamValue::Str(
            serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string()),
        ),
    }
}

/// Capture a stack trace at the current call site, regardless of
/// `RUST_BACKTRACE`.
pub fn capture_stack() -> String {
    let rendered = Backtrace::force_capture().to_string();
    if rendered.trim().is_empty() {
        "<no stack available>".to_string()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ErrorValue;
    use serde_json::json;

    fn meta(pairs: Vec<(&str, MetaValue)>) -> Metadata {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn named() {}

    #[test]
    fn error_message_supplies_message_and_stack() {
        let err = ErrorValue::new("boom").with_stack("Error: boom\n    at here");
        let report = format_report("error", &LogMessage::Error(err), None);

        assert_eq!(report.error.message, "boom");
        assert_eq!(report.error.stack, "Error: boom\n    at here");
    }

    #[test]
    fn error_stack_wins_over_metadata_stack() {
        let err = ErrorValue::new("boom").with_stack("own stack");
        let m = meta(vec![("stack", "meta stack".into())]);
        let report = format_report("error", &LogMessage::Error(err), Some(&m));

        assert_eq!(report.error.stack, "own stack");
    }

    #[test]
    fn metadata_stack_is_used_and_not_forwarded() {
        let m = meta(vec![("stack", "meta stack".into()), ("user", "bob".into())]);
        let report = format_report("error", &"oops".into(), Some(&m));

        assert_eq!(report.error.message, "oops");
        assert_eq!(report.error.stack, "meta stack");
        assert!(!report.custom_parameters.contains_key("stack"));
        assert_eq!(report.custom_parameters.get("user"), Some(&ParamValue::from("bob")));
    }

    #[test]
    fn nested_error_stack_is_used_when_no_top_level_stack() {
        let nested = ErrorValue::new("inner").with_stack("inner stack");
        let m = meta(vec![("error", nested.into())]);
        let report = format_report("error", &"oops".into(), Some(&m));

        assert_eq!(report.error.stack, "inner stack");
        assert_eq!(report.custom_parameters.get("error"), Some(&ParamValue::from("inner")));
    }

    #[test]
    fn top_level_stack_beats_nested_error_stack() {
        let nested = ErrorValue::new("inner").with_stack("inner stack");
        let m = meta(vec![("error", nested.into()), ("stack", "top stack".into())]);
        let report = format_report("error", &"oops".into(), Some(&m));

        assert_eq!(report.error.stack, "top stack");
    }

    #[test]
    fn message_error_without_stack_falls_back_to_metadata() {
        let m = meta(vec![("stack", "meta stack".into())]);
        let report = format_report("error", &LogMessage::Error(ErrorValue::new("boom")), Some(&m));

        assert_eq!(report.error.message, "boom");
        assert_eq!(report.error.stack, "meta stack");
    }

    #[test]
    fn fallback_stack_is_captured_without_metadata() {
        let report = format_report("info", &"plain".into(), None);

        assert!(!report.error.stack.is_empty());
        assert_eq!(report.custom_parameters.len(), 1);
        assert_eq!(report.custom_parameters.get(LOG_LEVEL_KEY), Some(&ParamValue::from("info")));
    }

    #[test]
    fn empty_metadata_behaves_like_absent_metadata() {
        let m = Metadata::new();
        let report = format_report("error", &"plain".into(), Some(&m));

        assert!(!report.error.stack.is_empty());
        assert_eq!(report.custom_parameters.keys().collect::<Vec<_>>(), vec![LOG_LEVEL_KEY]);
    }

    #[test]
    fn metadata_message_does_not_replace_reported_message() {
        let m = meta(vec![("message", "from meta".into())]);
        let report = format_report("error", &"original".into(), Some(&m));

        assert_eq!(report.error.message, "original");
        assert_eq!(report.custom_parameters.get("message"), Some(&ParamValue::from("from meta")));
    }

    #[test]
    fn mixed_metadata_is_coerced() {
        let obj = match json!({ "a": 1 }) {
            serde_json::Value::Object(o) => o,
            _ => unreachable!(),
        };
        let m = meta(vec![
            ("string", "v".into()),
            ("number", 5i64.into()),
            ("obj", MetaValue::Object(obj)),
            ("func", MetaValue::function(&named)),
        ]);
        let report = format_report("warn", &"oops".into(), Some(&m));

        let expected: CustomParameters = [
            ("logLevel", ParamValue::from("warn")),
            ("string", ParamValue::from("v")),
            ("number", ParamValue::from(5i64)),
            ("obj", ParamValue::from(r#"{"a":1}"#)),
            ("func", ParamValue::from("[Function: named]")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        assert_eq!(report.custom_parameters, expected);
    }

    #[test]
    fn empty_error_stack_falls_through() {
        let err = ErrorValue::new("boom").with_stack("");
        let report = format_report("error", &LogMessage::Error(err.clone()), None);
        assert!(!report.error.stack.is_empty());

        let m = meta(vec![("stack", "meta stack".into())]);
        let report = format_report("error", &LogMessage::Error(err), Some(&m));
        assert_eq!(report.error.stack, "meta stack");
    }

    #[test]
    fn closures_are_anonymous_functions() {
        let closure = || 1;
        assert_eq!(
            coerce_value(&MetaValue::function(&closure)),
            ParamValue::from("[Function (anonymous)]")
        );
    }

    fn generic<T>() {}

    #[test]
    fn generic_functions_keep_their_name() {
        assert_eq!(
            coerce_value(&MetaValue::function(&generic::<String>)),
            ParamValue::from("[Function: generic]")
        );
    }

    #[test]
    fn function_pointers_are_anonymous() {
        let pointer: fn() = named;
        assert_eq!(
            coerce_value(&MetaValue::function(&pointer)),
            ParamValue::from("[Function (anonymous)]")
        );
    }

    #[test]
    fn remaining_kinds_are_coerced() {
        let err = ErrorValue::new("bad input").with_name("TypeError");
        assert_eq!(coerce_value(&err.into()), ParamValue::from("TypeError: bad input"));
        assert_eq!(
            coerce_value(&MetaValue::from(json!([1, "two"]))),
            ParamValue::from(r#"[1,"two"]"#)
        );
        assert_eq!(coerce_value(&MetaValue::Null), ParamValue::Null);
        assert_eq!(coerce_value(&MetaValue::Bool(true)), ParamValue::Bool(true));
    }

    #[test]
    fn log_level_overrides_metadata_field() {
        let m = meta(vec![("logLevel", "spoofed".into())]);
        let report = format_report("error", &"oops".into(), Some(&m));

        assert_eq!(report.custom_parameters.get(LOG_LEVEL_KEY), Some(&ParamValue::from("error")));
    }

    #[test]
    fn formatting_twice_yields_equal_parameters() {
        let m = meta(vec![("user", "bob".into()), ("count", 3i64.into())]);
        let a = format_report("error", &"oops".into(), Some(&m));
        let b = format_report("error", &"oops".into(), Some(&m));

        assert_eq!(a.custom_parameters, b.custom_parameters);
        assert_eq!(a.error.message, b.error.message);
    }
}
