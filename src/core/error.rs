//! Error types for butterfly-profile
//!
//! Configuration problems are reported when a profile is built, encoding
//! problems when an edge value is packed. Data-quality issues in the source
//! tags are never errors: they resolve to documented fallbacks instead.

use thiserror::Error;

/// Main error type for profile construction and edge encoding
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Invalid rule table or encoder configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A named profile option could not be parsed
    #[error("Invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    /// A resolved value does not fit the configured bit width
    #[error("Encoding overflow: {field} value {value} exceeds maximum representable {max}")]
    EncodingOverflow {
        field: &'static str,
        value: f64,
        max: f64,
    },

    /// A resolved value is negative or not a finite number
    #[error("Cannot encode {field} value {value}")]
    InvalidValue { field: &'static str, value: f64 },

    /// Two different non-zero speeds, but the layout stores only one
    #[error("Forward speed {forward} and backward speed {backward} differ, but speed is not stored per direction")]
    DirectionalSpeedMismatch { forward: f64, backward: f64 },

    /// Profile name not present in the registry
    #[error("Profile '{name}' not found{}", suggestion_suffix(.suggestion))]
    UnknownProfile {
        name: String,
        suggestion: Option<String>,
    },

    /// A profile with the same name was already registered
    #[error("Profile '{0}' is already registered")]
    DuplicateProfile(String),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

impl Error {
    /// True for errors raised while building a profile
    pub fn is_config(&self) -> bool {
        matches!(self, Error::InvalidConfig(_) | Error::InvalidOption { .. })
    }

    /// True for errors raised while packing an edge value
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Error::EncodingOverflow { .. }
                | Error::InvalidValue { .. }
                | Error::DirectionalSpeedMismatch { .. }
        )
    }
}

/// Convenience result type for butterfly-profile operations
pub type Result<T> = std::result::Result<T, Error>;
