pub mod record;
pub mod format;
pub mod reporter;
pub mod transport;
pub mod adapter;
pub mod layer;
pub mod error;
pub mod backend;
pub mod global;
pub mod env;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "console")]
pub mod console;

pub mod init;
pub mod noop_reporter;
