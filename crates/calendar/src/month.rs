//! Year-month key for the monthly observation axis.

use crate::error::CalendarError;

/// A calendar month within a specific year.
///
/// Ordering is chronological (year first, then month), so `MonthKey` can key
/// sorted maps and be compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    /// Creates a new key, validating `month`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is not in 1..=12.
    pub fn new(year: i32, month: u8) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        Ok(Self { year, month })
    }

    /// Returns the year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the calendar month (1..=12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Returns the month immediately after this one.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of months from `other` to `self` (positive when `self` is
    /// later).
    pub fn months_since(&self, other: &MonthKey) -> i64 {
        (i64::from(self.year) - i64::from(other.year)) * 12
            + (i64::from(self.month) - i64::from(other.month))
    }
}
