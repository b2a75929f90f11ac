//! Logging utilities.
//!
//! The crate logs through the `log` facade only: state transitions at
//! `debug`, per-primitive detail at `trace`, dropped frames at `warn`.
//! Binaries opt into output with [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig};
