//! Inclusive study period over the month axis.

use crate::error::CalendarError;
use crate::month::MonthKey;

/// An inclusive range of months `[start, end]`.
///
/// The period defines the dense month axis: every derived series has exactly
/// `n_months()` slots, one per month, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyPeriod {
    start: MonthKey,
    end: MonthKey,
}

impl StudyPeriod {
    /// Creates a period spanning `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvertedPeriod`] if `end` precedes `start`.
    pub fn new(start: MonthKey, end: MonthKey) -> Result<Self, CalendarError> {
        if end < start {
            return Err(CalendarError::InvertedPeriod {
                start_year: start.year(),
                start_month: start.month(),
                end_year: end.year(),
                end_month: end.month(),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates a period covering whole years `start_year..=end_year`
    /// (January through December).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvertedPeriod`] if `end_year < start_year`.
    pub fn from_years(start_year: i32, end_year: i32) -> Result<Self, CalendarError> {
        let start = MonthKey::new(start_year, 1).expect("month 1 is valid");
        let end = MonthKey::new(end_year, 12).expect("month 12 is valid");
        Self::new(start, end)
    }

    /// Returns the first month of the period.
    pub fn start(&self) -> MonthKey {
        self.start
    }

    /// Returns the last month of the period.
    pub fn end(&self) -> MonthKey {
        self.end
    }

    /// Number of months in the period (always >= 1).
    pub fn n_months(&self) -> usize {
        (self.end.months_since(&self.start) + 1) as usize
    }

    /// Index of `key` on the period's month axis, or `None` if outside.
    pub fn index_of(&self, key: &MonthKey) -> Option<usize> {
        if *key < self.start || *key > self.end {
            return None;
        }
        Some(key.months_since(&self.start) as usize)
    }

    /// The month at axis position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_months()`.
    pub fn month_at(&self, index: usize) -> MonthKey {
        assert!(
            index < self.n_months(),
            "month_at: index {index} out of range for period of {} months",
            self.n_months()
        );
        let mut key = self.start;
        for _ in 0..index {
            key = key.succ();
        }
        key
    }

    /// Iterator over every month in the period, in order.
    pub fn months(&self) -> impl Iterator<Item = MonthKey> + '_ {
        (0..self.n_months()).map(|i| self.month_at(i))
    }

    /// Calendar month (1..=12) for every axis position, as a parallel vector.
    pub fn calendar_months(&self) -> Vec<u8> {
        self.months().map(|k| k.month()).collect()
    }

    /// Distinct years covered by the period, in order.
    pub fn years(&self) -> Vec<i32> {
        (self.start.year()..=self.end.year()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u8) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    #[test]
    fn single_month_period() {
        let p = StudyPeriod::new(ym(2020, 5), ym(2020, 5)).unwrap();
        assert_eq!(p.n_months(), 1);
        assert_eq!(p.month_at(0), ym(2020, 5));
    }

    #[test]
    fn inverted_period_rejected() {
        let err = StudyPeriod::new(ym(2021, 1), ym(2020, 12)).unwrap_err();
        assert!(matches!(err, CalendarError::InvertedPeriod { .. }));
    }

    #[test]
    fn from_years_spans_whole_years() {
        let p = StudyPeriod::from_years(2018, 2020).unwrap();
        assert_eq!(p.n_months(), 36);
        assert_eq!(p.start(), ym(2018, 1));
        assert_eq!(p.end(), ym(2020, 12));
    }

    #[test]
    fn index_of_roundtrip() {
        let p = StudyPeriod::new(ym(2019, 11), ym(2020, 3)).unwrap();
        assert_eq!(p.n_months(), 5);
        for i in 0..p.n_months() {
            let k = p.month_at(i);
            assert_eq!(p.index_of(&k), Some(i));
        }
    }

    #[test]
    fn index_of_outside() {
        let p = StudyPeriod::from_years(2020, 2020).unwrap();
        assert_eq!(p.index_of(&ym(2019, 12)), None);
        assert_eq!(p.index_of(&ym(2021, 1)), None);
    }

    #[test]
    fn calendar_months_rollover() {
        let p = StudyPeriod::new(ym(2019, 11), ym(2020, 2)).unwrap();
        assert_eq!(p.calendar_months(), vec![11, 12, 1, 2]);
    }

    #[test]
    fn years_listing() {
        let p = StudyPeriod::new(ym(2019, 7), ym(2021, 2)).unwrap();
        assert_eq!(p.years(), vec![2019, 2020, 2021]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn month_at_out_of_range_panics() {
        let p = StudyPeriod::from_years(2020, 2020).unwrap();
        p.month_at(12);
    }
}
