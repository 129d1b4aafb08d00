//! Logging utilities.
//!
//! Every human-readable line the harness emits (registrations, start and
//! rejection notices, progress, final summary) goes through the `log` facade.
//! This module only installs the `env_logger` backend.

mod init;

pub use init::{init_logging, LoggingConfig};
