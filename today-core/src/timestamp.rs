//! ICS date-times, the injectable clock, and the day window.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};

use crate::slice::Slice;

/// A date-time as written in a feed (`YYYYMMDDTHHMMSS[Z]`).
///
/// Fields are kept as parsed and may be out of range; comparisons go through
/// [`Timestamp::to_local`], which carries overflow into the next unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamp {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    /// Trailing marker after the seconds, `Some('Z')` for UTC.
    pub tz: Option<char>,
}

impl Timestamp {
    /// Read the fixed-offset fields of an ICS date-time value.
    ///
    /// The `T` at offset 8 is not checked; missing or non-numeric fields read
    /// as 0, so a date-only value (`20240101`) lands on midnight.
    pub fn parse(value: Slice<'_>) -> Timestamp {
        let field = |start, len| value.sub(start, len).parse_int() as i32;

        Timestamp {
            year: field(0, 4),
            month: field(4, 2),
            day: field(6, 2),
            hour: field(9, 2),
            minute: field(11, 2),
            second: field(13, 2),
            tz: value.as_bytes().get(15).map(|&b| b as char),
        }
    }

    pub fn from_naive(dt: NaiveDateTime) -> Timestamp {
        Timestamp {
            year: dt.year(),
            month: dt.month() as i32,
            day: dt.day() as i32,
            hour: dt.hour() as i32,
            minute: dt.minute() as i32,
            second: dt.second() as i32,
            tz: None,
        }
    }

    pub fn is_utc(&self) -> bool {
        self.tz == Some('Z')
    }

    /// Normalise into local wall-clock time.
    ///
    /// Out-of-range fields overflow into the next unit (month 13 is January of
    /// the following year, day 0 is the last day of the previous month). UTC
    /// values are shifted into the local zone.
    pub fn to_local(&self) -> NaiveDateTime {
        let months = i64::from(self.year) * 12 + i64::from(self.month) - 1;
        let base = i32::try_from(months.div_euclid(12))
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, months.rem_euclid(12) as u32 + 1, 1))
            .and_then(|d| d.and_hms_opt(0, 0, 0));

        let offset = TimeDelta::days(i64::from(self.day) - 1)
            + TimeDelta::hours(i64::from(self.hour))
            + TimeDelta::minutes(i64::from(self.minute))
            + TimeDelta::seconds(i64::from(self.second));

        let naive = base
            .and_then(|b| b.checked_add_signed(offset))
            .unwrap_or(NaiveDateTime::MIN);

        if self.is_utc() {
            Utc.from_utc_datetime(&naive)
                .with_timezone(&Local)
                .naive_local()
        } else {
            naive
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.to_local() == other.to_local()
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_local().cmp(&other.to_local())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if let Some(tz) = self.tz {
            write!(f, "{tz}")?;
        }
        Ok(())
    }
}

/// Source of "now", in local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Local 00:00:00 to 23:59:59 of one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DayWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        DayWindow {
            start: date.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN),
            end: date.and_hms_opt(23, 59, 59).unwrap_or(NaiveDateTime::MIN),
        }
    }

    pub fn today(clock: &dyn Clock) -> Self {
        Self::for_date(clock.today())
    }

    /// Strictly after the start and strictly before the end.
    pub fn contains(&self, ts: &Timestamp) -> bool {
        let t = ts.to_local();
        self.start < t && t < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_fixed_offsets() {
        let ts = Timestamp::parse(Slice::from("20240101T093015"));
        assert_eq!(
            (ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second),
            (2024, 1, 1, 9, 30, 15)
        );
        assert_eq!(ts.tz, None);
        assert_eq!(ts.to_local(), at(2024, 1, 1, 9, 30) + TimeDelta::seconds(15));
    }

    #[test]
    fn test_parse_utc_marker() {
        let ts = Timestamp::parse(Slice::from("20240101T093000Z"));
        assert!(ts.is_utc());
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let ts = Timestamp::parse(Slice::from("20240315"));
        assert_eq!(ts.to_local(), at(2024, 3, 15, 0, 0));
    }

    #[test]
    fn test_malformed_fields_collapse_to_zero() {
        let ts = Timestamp::parse(Slice::from("2024XX01T09aa00"));
        assert_eq!(ts.month, 0);
        assert_eq!(ts.minute, 0);
        assert_eq!(ts.hour, 9);
    }

    #[test]
    fn test_overflow_normalises() {
        let ts = Timestamp {
            year: 2023,
            month: 13,
            day: 32,
            ..Default::default()
        };
        assert_eq!(ts.to_local(), at(2024, 2, 1, 0, 0));
    }

    #[test]
    fn test_ordering_uses_normalised_time() {
        let a = Timestamp::parse(Slice::from("20231231T235959"));
        let b = Timestamp::parse(Slice::from("20240101T000000"));
        assert!(a < b);

        let c = Timestamp {
            year: 2023,
            month: 12,
            day: 32,
            ..Default::default()
        };
        assert_eq!(b, c);
    }

    #[test]
    fn test_day_window_is_strict() {
        let window = DayWindow::for_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert!(window.contains(&Timestamp::from_naive(at(2024, 1, 1, 9, 0))));
        assert!(!window.contains(&Timestamp::from_naive(at(2024, 1, 1, 0, 0))));
        assert!(!window.contains(&Timestamp::from_naive(at(2024, 1, 2, 9, 0))));
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(at(2024, 1, 1, 9, 0));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(DayWindow::today(&clock).start, at(2024, 1, 1, 0, 0));
    }
}
