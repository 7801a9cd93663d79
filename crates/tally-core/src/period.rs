//! # Report Periods
//!
//! Calendar days and months in the shop's time zone, and their bounds as
//! UTC instants for range queries.
//!
//! ```text
//! Period::Day(2024-03-10) in Europe/Paris
//!   start = 2024-03-09T23:00:00Z   (local midnight)
//!   end   = 2024-03-10T23:00:00Z   (next local midnight, exclusive)
//!
//! SQL: created_at >= start AND created_at < end
//! ```
//!
//! Functions are generic over `TimeZone` and never read the clock; callers
//! pass `Local` and `Utc::now()` in production and `Utc` in tests.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use std::fmt;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// A reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// A single calendar day.
    Day(NaiveDate),
    /// A calendar month, identified by its first day.
    Month(NaiveDate),
}

impl Period {
    /// The calendar day containing `now` in its own time zone.
    pub fn today<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Period::Day(now.date_naive())
    }

    /// The calendar month containing `now` in its own time zone.
    pub fn this_month<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let date = now.date_naive();
        Period::Month(date - Days::new(u64::from(date.day0())))
    }

    /// Parses a `YYYY-MM-DD` day.
    pub fn parse_day(s: &str) -> ValidationResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Period::Day)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "date".to_string(),
                reason: "expected YYYY-MM-DD".to_string(),
            })
    }

    /// Parses a `YYYY-MM` month.
    pub fn parse_month(s: &str) -> ValidationResult<Self> {
        let s = s.trim();
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: "expected YYYY-MM".to_string(),
        };

        // "2024-03-05" must not sneak through as "2024-03-05-01"
        if s.len() != 7 {
            return Err(invalid());
        }

        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map(Period::Month)
            .map_err(|_| invalid())
    }

    /// First calendar day of the period.
    pub fn first_day(&self) -> NaiveDate {
        match *self {
            Period::Day(date) | Period::Month(date) => date,
        }
    }

    /// First calendar day after the period.
    pub fn end_day(&self) -> NaiveDate {
        match *self {
            Period::Day(date) => date + Days::new(1),
            Period::Month(first) => first + Months::new(1),
        }
    }

    /// Half-open `[start, end)` bounds of the period as UTC instants.
    pub fn bounds<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            local_midnight(self.first_day(), tz),
            local_midnight(self.end_day(), tz),
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Period::Month(first) => write!(f, "{}", first.format("%Y-%m")),
        }
    }
}

/// Calendar day of an instant in the given time zone.
pub fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// The UTC instant of local midnight starting `date`.
///
/// When midnight falls in a DST gap, the wall-clock time is read as UTC,
/// which lands within the gap hour.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(Period::parse_day("2024-02-29").unwrap(), Period::Day(date(2024, 2, 29)));
        assert!(Period::parse_day("2023-02-29").is_err());
        assert!(Period::parse_day("yesterday").is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(Period::parse_month("2024-12").unwrap(), Period::Month(date(2024, 12, 1)));
        assert!(Period::parse_month("2024-13").is_err());
        assert!(Period::parse_month("2024-12-05").is_err());
    }

    #[test]
    fn test_month_end_rolls_over_year() {
        let dec = Period::parse_month("2024-12").unwrap();
        assert_eq!(dec.end_day(), date(2025, 1, 1));
        let feb = Period::parse_month("2024-02").unwrap();
        assert_eq!(feb.end_day() - feb.first_day(), chrono::Duration::days(29));
    }

    #[test]
    fn test_this_month_from_mid_month() {
        let now = Utc.with_ymd_and_hms(2024, 7, 19, 15, 30, 0).unwrap();
        assert_eq!(Period::this_month(&now), Period::Month(date(2024, 7, 1)));
        assert_eq!(Period::today(&now), Period::Day(date(2024, 7, 19)));
    }

    #[test]
    fn test_day_bounds_in_utc() {
        let (start, end) = Period::Day(date(2024, 3, 10)).bounds(&Utc);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_bounds_in_offset_zone() {
        let paris = FixedOffset::east_opt(3600).unwrap();
        let (start, end) = Period::Day(date(2024, 3, 10)).bounds(&paris);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 9, 23, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap();
        assert_eq!(local_date(&instant, &tokyo), date(2024, 3, 11));
        assert_eq!(local_date(&instant, &Utc), date(2024, 3, 10));
    }

    #[test]
    fn test_display() {
        assert_eq!(Period::Day(date(2024, 1, 5)).to_string(), "2024-01-05");
        assert_eq!(Period::Month(date(2024, 1, 1)).to_string(), "2024-01");
    }
}
