use chrono::{Days, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// An inclusive span of calendar dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::Validation(format!(
                "date range ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// `days` consecutive dates beginning at `start`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a zero-length span or one that runs
    /// past the end of the calendar.
    pub fn spanning(start: NaiveDate, days: u32) -> Result<Self, CoreError> {
        let extra = days
            .checked_sub(1)
            .ok_or_else(|| CoreError::Validation("date range must cover at least one day".into()))?;
        let end = start
            .checked_add_days(Days::new(u64::from(extra)))
            .ok_or_else(|| CoreError::Validation(format!("date range from {start} overflows")))?;
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|day| *day <= self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn rejects_reversed_range() {
        assert!(DateRange::new(date(5), date(4)).is_err());
    }

    #[test]
    fn week_span_covers_seven_days() {
        let week = DateRange::spanning(date(2), 7).unwrap();
        assert_eq!(week.end, date(8));
        assert_eq!(week.days().count(), 7);
        assert!(week.contains(date(8)));
        assert!(!week.contains(date(9)));
    }

    #[test]
    fn zero_day_span_is_invalid() {
        assert!(DateRange::spanning(date(2), 0).is_err());
    }
}
