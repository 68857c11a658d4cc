//! Object key helpers for date-partitioned buckets

use chrono::NaiveDate;

/// Key prefix of a date partition: `YYYY/YYYY-MM/DD/`
pub fn make_date_prefix(date: NaiveDate) -> String {
    date.format("%Y/%Y-%m/%d/").to_string()
}

/// Object key for a file under a prefix
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

/// Hadoop S3A URI of an object
pub fn s3a_uri(bucket: &str, key: &str) -> String {
    format!("s3a://{}/{}", bucket, key)
}
