use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use tracing_apm_errors::adapter::{AdapterOptions, LogAdapter};
use tracing_apm_errors::init::{init_tracing_with_config, LayerConfig};
use tracing_apm_errors::noop_reporter::NoopReporter;

fn main() {
    let options = AdapterOptions::default().with_reporter(Arc::new(NoopReporter));
    let layer_config = LayerConfig {
        enable_stdout: false,
        include_source_location: true,
    };

    init_tracing_with_config(Arc::new(LogAdapter::new(options)), layer_config)
        .expect("install subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("noop reporter: formatted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
