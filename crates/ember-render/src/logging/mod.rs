//! Logging utilities.
//!
//! This module centralizes logger initialization behind the standard `log`
//! facade. The library itself only ever emits through the facade (polled
//! API errors, compile/link diagnostics, dropped requests) and never
//! initializes a logger on its own; binaries and test harnesses opt in
//! through [`init_logging`].

mod init;

pub use init::{LoggingConfig, init_logging};
