//! CLI-specific utilities for butterfly-profile
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod progress;
pub mod records;

pub use progress::ProgressManager;
pub use records::{encode_batch, parse_line, parse_option, EncodeStats, WayRecord};
