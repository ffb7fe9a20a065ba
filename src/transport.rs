use crate::error::AdapterError;
use crate::record::{LogMessage, Metadata};

/// Completion callback for a single log call: `(error, accepted)`.
pub type DoneCallback = Box<dyn FnOnce(Option<AdapterError>, bool) + Send>;

/// Third positional argument of [`Transport::log`].
///
/// Hosts may pass either the metadata bag or, when there is no metadata,
/// the completion callback in this slot.
pub enum MetaArg {
    Fields(Metadata),
    Done(DoneCallback),
}

impl From<Metadata> for MetaArg {
    fn from(m: Metadata) -> Self {
        MetaArg::Fields(m)
    }
}

impl std::fmt::Debug for MetaArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetaArg::Fields(m) => f.debug_tuple("Fields").field(m).finish(),
            MetaArg::Done(_) => f.write_str("Done(..)"),
        }
    }
}

/// Capability set a logging host expects from a pluggable sink.
pub trait Transport: Send + Sync {
    /// Stable name of the transport.
    fn name(&self) -> &str;

    /// Least severe level the host should dispatch to this transport.
    fn level(&self) -> &str;

    /// Handle one log event.
    fn log(
        &self,
        level: &str,
        message: LogMessage,
        meta: Option<MetaArg>,
        done: Option<DoneCallback>,
    );
}
