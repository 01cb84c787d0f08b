//! Day boundary computation

use chrono::{Local, NaiveDate};
use std::sync::{Arc, RwLock};

/// Date format used in persisted records
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for rollover decisions
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Current calendar date in the observer's timezone
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for tests and replays
///
/// Clones share the same date, so a test can keep a handle and advance the
/// day while the tracker holds another.
#[derive(Debug, Clone)]
pub struct FixedClock {
    day: Arc<RwLock<NaiveDate>>,
}

impl FixedClock {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Arc::new(RwLock::new(day)),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        if let Ok(mut current) = self.day.write() {
            *current = day;
        }
    }

    /// Move forward by one calendar day
    pub fn advance_day(&self) {
        if let Ok(mut current) = self.day.write() {
            *current = current.succ_opt().unwrap_or(*current);
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.day.read() {
            Ok(day) => *day,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Format a date as `YYYY-MM-DD`
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DAY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_and_parse() {
        assert_eq!(format_day(day(2024, 1, 2)), "2024-01-02");
        assert_eq!(parse_day("2024-01-02"), Some(day(2024, 1, 2)));
        assert_eq!(parse_day("2024-1-2x"), None);
        assert_eq!(parse_day("02/01/2024"), None);
    }

    #[test]
    fn test_fixed_clock_shared_between_clones() {
        let clock = FixedClock::new(day(2024, 12, 31));
        let handle = clock.clone();

        handle.advance_day();
        assert_eq!(clock.today(), day(2025, 1, 1));

        handle.set(day(2024, 2, 29));
        assert_eq!(clock.today(), day(2024, 2, 29));
    }

    #[test]
    fn test_local_clock_matches_chrono() {
        let before = Local::now().date_naive();
        let today = LocalClock.today();
        let after = Local::now().date_naive();
        assert!(today >= before && today <= after);
    }
}
