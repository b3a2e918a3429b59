use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive calendar date range: both `start` and `end` belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The calendar month containing `date`: day 1 through its last day.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = first_of_month(date.year(), date.month());
        Self {
            start,
            end: last_of_month(date.year(), date.month()),
        }
    }

    /// The calendar month immediately before the one containing `date`.
    /// January rolls back to December of the previous year.
    pub fn previous_month_of(date: NaiveDate) -> Self {
        let (year, month) = if date.month() == 1 {
            (date.year() - 1, 12)
        } else {
            (date.year(), date.month() - 1)
        };
        Self {
            start: first_of_month(year, month),
            end: last_of_month(year, month),
        }
    }

    /// `start <= date <= end`
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the range, counting both ends. Zero if `end < start`.
    #[must_use]
    pub fn num_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

// Day 1 of the following month, minus one day.
fn last_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
