//! Logger initialization.
//!
//! The engine only emits through the `log` facade; hosts that already run a
//! logger can skip this module entirely.

mod init;

pub use init::{init_logging, LoggingConfig};
