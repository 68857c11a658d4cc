//! Distributed compute session bootstrap

pub mod session;

pub use session::{SessionConfig, SessionConfigBuilder, LOCAL_MASTER};
