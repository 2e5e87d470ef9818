//! Built-in routing profiles
//!
//! Each profile is a declarative parameter set fed into the shared engine in
//! [`crate::core`]; none adds behaviour of its own.

pub mod horse;
pub mod registry;

pub use registry::ProfileRegistry;
