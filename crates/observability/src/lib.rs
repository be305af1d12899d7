//! Logging for reportcard.
//!
//! - [`LogArgs`] - Logging command-line arguments
//! - [`init_logging`] - Install the global `tracing` subscriber

mod args;
mod logging;

pub use args::LogArgs;
pub use logging::{build_filter, init_logging};
