use std::sync::Arc;

use tracing::{error, info};
use tracing_apm_errors::{
    adapter::AdapterOptions,
    init::init_tracing,
    record::{CustomParameters, ReportedError},
    reporter::ErrorReporter,
};

/// Example of integrating a proprietary APM agent by implementing the
/// `ErrorReporter` trait directly.
struct MyAgentReporter;

impl ErrorReporter for MyAgentReporter {
    fn notice_error(&self, error: &ReportedError, custom_parameters: &CustomParameters) {
        // Here you would call the agent's own notice-error API.
        println!("[my-agent] {} {:?}", error.message, custom_parameters);
    }
}

fn main() {
    let options = AdapterOptions::default().with_reporter(Arc::new(MyAgentReporter));
    init_tracing(options).expect("install subscriber");

    info!("custom reporter example started");
    error!(order_id = 123, "payment declined");
}
