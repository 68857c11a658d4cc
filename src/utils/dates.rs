//! Execution date utilities
//!
//! Scheduler execution dates arrive as ISO strings, dates or date-times; they
//! are normalized to a naive date-time (dates at midnight).

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::str::FromStr;

use crate::error::DateError;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A normalized execution date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExecutionDate(NaiveDateTime);

impl ExecutionDate {
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
}

impl From<NaiveDateTime> for ExecutionDate {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl From<NaiveDate> for ExecutionDate {
    fn from(value: NaiveDate) -> Self {
        Self(value.and_time(NaiveTime::MIN))
    }
}

impl FromStr for ExecutionDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_execution_date(s).map(Self)
    }
}

/// Parse an ISO execution date or date-time
///
/// Offsets are accepted and dropped, keeping the wall-clock time.
pub fn parse_execution_date(input: &str) -> Result<NaiveDateTime, DateError> {
    let text = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(datetime);
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.naive_local());
    }

    Err(DateError::Invalid {
        input: input.to_string(),
    })
}

/// `length` date-times one day apart, ascending, ending at `end`
///
/// Fails when the first day would fall before the earliest date chrono can
/// represent.
pub fn date_range(
    end: impl Into<ExecutionDate>,
    length: usize,
) -> Result<Vec<NaiveDateTime>, DateError> {
    let end = end.into().datetime();
    (0..length as u64)
        .rev()
        .map(|offset| {
            end.checked_sub_days(Days::new(offset))
                .ok_or(DateError::OutOfRange { end, length })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_from_datetime() {
        let value = datetime(2024, 5, 25, 12, 30);
        assert_eq!(ExecutionDate::from(value).datetime(), value);
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 25).unwrap();
        assert_eq!(
            ExecutionDate::from(date).datetime(),
            datetime(2024, 5, 25, 0, 0)
        );
    }

    #[test]
    fn test_parse_datetime_string() {
        assert_eq!(
            parse_execution_date("2024-05-25T12:30:00").unwrap(),
            datetime(2024, 5, 25, 12, 30)
        );
        assert_eq!(
            parse_execution_date("2024-05-25 12:30").unwrap(),
            datetime(2024, 5, 25, 12, 30)
        );
    }

    #[test]
    fn test_parse_date_string() {
        assert_eq!(
            parse_execution_date("2024-05-25").unwrap(),
            datetime(2024, 5, 25, 0, 0)
        );
    }

    #[test]
    fn test_parse_with_offset_keeps_wall_clock() {
        assert_eq!(
            parse_execution_date("2024-05-25T12:30:00+02:00").unwrap(),
            datetime(2024, 5, 25, 12, 30)
        );
    }

    #[test]
    fn test_parse_invalid_string() {
        let err = parse_execution_date("not-a-date").unwrap_err();
        assert!(err.to_string().contains("not-a-date"));
        assert!("2024-13-01".parse::<ExecutionDate>().is_err());
    }

    #[test]
    fn test_date_range_with_datetime() {
        let range = date_range(datetime(2024, 5, 25, 12, 0), 3).unwrap();
        assert_eq!(
            range,
            vec![
                datetime(2024, 5, 23, 12, 0),
                datetime(2024, 5, 24, 12, 0),
                datetime(2024, 5, 25, 12, 0),
            ]
        );
    }

    #[test]
    fn test_date_range_with_string() {
        let end: ExecutionDate = "2024-05-25T12:00:00".parse().unwrap();
        assert_eq!(
            date_range(end, 2).unwrap(),
            vec![datetime(2024, 5, 24, 12, 0), datetime(2024, 5, 25, 12, 0)]
        );
    }

    #[test]
    fn test_date_range_with_date_crosses_month() {
        let end = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(
            date_range(end, 2).unwrap(),
            vec![datetime(2024, 5, 31, 0, 0), datetime(2024, 6, 1, 0, 0)]
        );
    }

    #[test]
    fn test_date_range_empty() {
        assert!(date_range(datetime(2024, 5, 25, 0, 0), 0).unwrap().is_empty());
    }

    #[test]
    fn test_date_range_before_earliest_date() {
        let err = date_range(datetime(2024, 5, 25, 0, 0), 200_000_000).unwrap_err();
        assert!(matches!(err, DateError::OutOfRange { length: 200_000_000, .. }));
        assert!(err.to_string().contains("200000000"));
    }
}
