//! Object storage helpers
//!
//! Bucket management, file transfer and date-partitioned listing against an
//! S3-compatible service whose credentials come from config resolution.

pub mod client;
pub mod credentials;
pub mod prefix;

pub use client::ObjectStore;
pub use credentials::StorageCredentials;
pub use prefix::{make_date_prefix, object_key, s3a_uri};
