use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{error, info};
use tracing_apm_errors::{
    adapter::AdapterOptions,
    backend::{make_reporter_from_config, parse_dsn},
    global::set_error_reporter,
    init::init_tracing,
    reporter::ErrorReporter,
};

#[tokio::main]
async fn main() {
    // Example DSN: https://insights-collector.example.com/v1/accounts/1/events
    let dsn = std::env::var("APM_ERRORS_DSN")
        .unwrap_or_else(|_| "http://127.0.0.1:8080/events".to_string());

    let backend_cfg = parse_dsn(&dsn).expect("invalid APM_ERRORS_DSN");
    let reporter: Arc<dyn ErrorReporter> = make_reporter_from_config(&backend_cfg)
        .expect("failed to build reporter");

    // Installed globally, so adapters built without a reporter pick it up.
    set_error_reporter(reporter).expect("global reporter already set");
    init_tracing(AdapterOptions::from_env()).expect("install subscriber");

    info!("dsn reporter example started");
    error!(upstream = "billing", "simulated error sent via HTTP reporter");

    // Give the spawned request time to complete.
    sleep(Duration::from_secs(2)).await;
}
