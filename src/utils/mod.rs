//! Utility modules
//!
//! Contains execution date parsing and date range helpers.

pub mod dates;

pub use dates::{date_range, parse_execution_date, ExecutionDate};
