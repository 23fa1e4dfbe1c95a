//! Logging for the dataset tools
//!
//! This module provides:
//! - Custom log formatting with bracketed output
//! - Dual logging (file + stderr)
//! - Timestamped log files with bounded retention

mod formatter;
mod setup;

pub use setup::setup_logging;
