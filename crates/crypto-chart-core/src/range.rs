use chrono::{Local, NaiveDate};

/// Default first day of history requested.
pub const DEFAULT_START: NaiveDate = match NaiveDate::from_ymd_opt(2024, 1, 1) {
    Some(d) => d,
    None => panic!("invalid default start date"),
};

/// Calendar range `[start, end)` of daily bars to request.
/// The end date itself is not included, matching the provider's `period2` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Resolve an optional end date against `today`.
    pub fn resolve(start: NaiveDate, end: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            start,
            end: end.unwrap_or(today),
        }
    }

    /// Resolve an optional end date against the local calendar date right now.
    pub fn ending_today(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self::resolve(start, end, Local::now().date_naive())
    }

    /// Unix seconds at 00:00 UTC on the start date.
    pub fn start_timestamp(&self) -> i64 {
        midnight_utc(self.start)
    }

    /// Unix seconds at 00:00 UTC on the (excluded) end date.
    pub fn end_timestamp(&self) -> i64 {
        midnight_utc(self.end)
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::ending_today(DEFAULT_START, None)
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}
