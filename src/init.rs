use crate::adapter::{AdapterOptions, LogAdapter};
use crate::error::InitError;
use crate::layer::ApmErrorLayer;
use crate::transport::Transport;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the subscriber installed by [`init_tracing_with_config`].
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked next to [`ApmErrorLayer`] so events are also printed.
/// - `include_source_location`: add `target`, `module_path`, `file` and
///   `line` to the custom parameters of every report.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
    pub include_source_location: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            include_source_location: true,
        }
    }
}

/// Install a global `tracing` subscriber that forwards events to
/// `transport`.
///
/// **Parameters**
/// - `transport`: usually a [`LogAdapter`]; its level is the forwarding
///   threshold.
/// - `config`: [`LayerConfig`] controlling the extra layers.
///
/// **Returns**
/// - `Err(InitError::Config(..))` if the transport's level is unknown.
/// - `Err(InitError::SetGlobal(..))` if a global subscriber already exists.
pub fn init_tracing_with_config(
    transport: Arc<dyn Transport>,
    config: LayerConfig,
) -> Result<(), InitError> {
    let layer = ApmErrorLayer::new(transport)?
        .with_source_location(config.include_source_location);

    // The two branches build different subscriber types, so each installs
    // its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Initialize tracing with sensible defaults.
///
/// Builds a [`LogAdapter`] from `options` (resolving the process-wide
/// reporter if none is given) and installs it with
/// [`LayerConfig::default`]. This is the recommended entrypoint for
/// typical services.
pub fn init_tracing(options: AdapterOptions) -> Result<(), InitError> {
    let adapter = LogAdapter::new(options);
    init_tracing_with_config(Arc::new(adapter), LayerConfig::default())
}
