//! # gaia-filter
//!
//! Outlier and range filtering for monthly indicator series. Two independent
//! passes, both in place, both deletions (value becomes missing, never
//! substituted):
//!
//! 1. physical-range clipping against a per-variable interval, then
//! 2. IQR outlier removal with Tukey fences, skipped for small samples.
//!
//! Filtering strictly reduces the number of present values. Absence of data
//! is a valid outcome, not an error.

mod error;
mod iqr;
mod range;

pub use error::FilterError;
pub use iqr::{MIN_IQR_SAMPLE, remove_iqr_outliers};
pub use range::{ValueRange, clip_range};

/// Counts of values deleted by each filtering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// Values outside the physical range.
    pub range_removed: usize,
    /// Values outside the Tukey fences.
    pub iqr_removed: usize,
}

/// Runs both filter passes in order: range clip, then IQR removal.
pub fn apply_filters(values: &mut [Option<f64>], range: &ValueRange) -> FilterSummary {
    let range_removed = clip_range(values, range);
    let iqr_removed = remove_iqr_outliers(values);
    FilterSummary {
        range_removed,
        iqr_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_passes_run_in_order() {
        // 2.0 is outside the physical range; with it gone the IQR pass sees
        // nine plausible values and deletes the statistical outlier 0.95.
        let mut values = vec![
            Some(0.40),
            Some(0.41),
            Some(0.42),
            Some(0.40),
            Some(0.43),
            Some(0.41),
            Some(0.42),
            Some(0.95),
            Some(2.0),
        ];
        let range = ValueRange::bounded(-0.2, 1.0).unwrap();
        let summary = apply_filters(&mut values, &range);
        assert_eq!(summary.range_removed, 1);
        assert_eq!(summary.iqr_removed, 1);
        assert_eq!(values[7], None);
        assert_eq!(values[8], None);
    }

    #[test]
    fn filtering_only_deletes() {
        let mut values = vec![Some(0.5), Some(-5.0), None];
        let before: Vec<Option<f64>> = values.clone();
        let range = ValueRange::bounded(0.0, 1.0).unwrap();
        apply_filters(&mut values, &range);
        for (b, a) in before.iter().zip(values.iter()) {
            // Every surviving value is unchanged; no new values appear.
            if a.is_some() {
                assert_eq!(a, b);
            }
        }
    }
}
