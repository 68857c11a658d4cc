//! Error types
//!
//! One error enum per concern: config resolution, object storage and
//! execution-date parsing.

pub mod types;

pub use types::{ConfigError, DateError, StorageError};
