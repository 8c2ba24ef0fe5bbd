//! # gaia-impute
//!
//! Gap-aware imputation for dense monthly series. The cascade prefers the
//! most local estimate that is defensible and falls back outward only when
//! local evidence is insufficient:
//!
//! 1. classify maximal missing runs by length against a per-variable
//!    threshold;
//! 2. linearly interpolate short interior runs;
//! 3. fill the rest from the series' own seasonal climatology;
//! 4. district per-calendar-month mean;
//! 5. province per-calendar-month mean;
//! 6. dataset-wide variable mean.
//!
//! Each step is a total function over the series that touches only slots
//! still missing after the previous step, so the stages compose and are
//! independently testable. A series with no usable estimate anywhere is
//! returned untouched and reported as unresolved, never zero-filled.

mod climatology;
mod error;
mod fallback;
mod gaps;
mod interpolate;

pub use climatology::{fill_from_monthly, monthly_means};
pub use error::ImputeError;
pub use fallback::{FallbackMeans, fill_global};
pub use gaps::{Segment, missing_segments};
pub use interpolate::fill_short_gaps;

/// Per-step fill counts for one imputed series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    /// Values filled by linear interpolation.
    pub interpolated: usize,
    /// Values filled from the unit's own seasonal climatology.
    pub climatology: usize,
    /// Values filled from the district fallback.
    pub district: usize,
    /// Values filled from the province fallback.
    pub province: usize,
    /// Values filled from the global fallback.
    pub global: usize,
    /// False when the series still has missing values after every step
    /// (degenerate input: no non-missing observation anywhere to draw from).
    pub resolved: bool,
}

impl FillSummary {
    /// Total number of values filled across all steps.
    pub fn total_filled(&self) -> usize {
        self.interpolated + self.climatology + self.district + self.province + self.global
    }
}

/// Runs the full imputation cascade on one dense series, in place.
///
/// `months` is the parallel calendar-month axis (1..=12 per entry). A run of
/// `L` consecutive missing months is "short" when `L < gap_threshold`.
///
/// # Errors
///
/// Returns [`ImputeError::LengthMismatch`] if the axes differ in length, or
/// [`ImputeError::InvalidMonth`] if the month axis holds a value outside
/// 1..=12. Degenerate input is *not* an error: the summary comes back with
/// `resolved == false` and the series is left as-is for the caller to
/// surface.
pub fn impute_series(
    values: &mut [Option<f64>],
    months: &[u8],
    gap_threshold: usize,
    fallback: &FallbackMeans,
) -> Result<FillSummary, ImputeError> {
    if values.len() != months.len() {
        return Err(ImputeError::LengthMismatch {
            values: values.len(),
            months: months.len(),
        });
    }
    for (index, &month) in months.iter().enumerate() {
        if !(1..=12).contains(&month) {
            return Err(ImputeError::InvalidMonth { index, month });
        }
    }

    let mut summary = FillSummary::default();

    // Step 1+2: short interior gaps.
    summary.interpolated = fill_short_gaps(values, gap_threshold);

    // Step 3: own seasonal climatology, computed after interpolation so the
    // monthly means reflect the partially repaired series.
    let clim = monthly_means(values, months);
    summary.climatology = fill_from_monthly(values, months, &clim);

    // Steps 4-6: hierarchical fallbacks.
    summary.district = fill_from_monthly(values, months, &fallback.district);
    summary.province = fill_from_monthly(values, months, &fallback.province);
    summary.global = fill_global(values, fallback.global);

    summary.resolved = values.iter().all(Option::is_some);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn length_mismatch_rejected() {
        let mut values = vec![None; 3];
        let months = vec![1, 2];
        let err = impute_series(&mut values, &months, 2, &FallbackMeans::default()).unwrap_err();
        assert_eq!(
            err,
            ImputeError::LengthMismatch {
                values: 3,
                months: 2
            }
        );
    }

    #[test]
    fn invalid_month_rejected() {
        let mut values = vec![None; 2];
        let months = vec![1, 13];
        let err = impute_series(&mut values, &months, 2, &FallbackMeans::default()).unwrap_err();
        assert_eq!(err, ImputeError::InvalidMonth { index: 1, month: 13 });
    }

    #[test]
    fn short_gap_interpolated_before_climatology() {
        // 1-month gap (< threshold 2) between 1.0 and 3.0: interpolation
        // gives 2.0 even though the month-1 climatology would give 1.0.
        let mut values = vec![Some(1.0), None, Some(3.0), Some(1.0)];
        let months = vec![1, 2, 3, 1];
        let summary =
            impute_series(&mut values, &months, 2, &FallbackMeans::default()).unwrap();
        assert_eq!(summary.interpolated, 1);
        assert_eq!(summary.climatology, 0);
        assert_relative_eq!(values[1].unwrap(), 2.0, epsilon = 1e-12);
        assert!(summary.resolved);
    }

    #[test]
    fn long_gap_goes_to_climatology() {
        // 2-month gap (>= threshold 2) -> filled from same-month means.
        let mut values = vec![
            Some(0.40),
            Some(0.42),
            None,
            None,
            Some(0.40),
            Some(0.44),
            Some(0.50),
            Some(0.52),
        ];
        let months = vec![1, 2, 3, 4, 1, 2, 3, 4];
        let summary =
            impute_series(&mut values, &months, 2, &FallbackMeans::default()).unwrap();
        assert_eq!(summary.interpolated, 0);
        assert_eq!(summary.climatology, 2);
        // Month 3 mean = 0.50 (only year 2), month 4 mean = 0.52.
        assert_relative_eq!(values[2].unwrap(), 0.50, epsilon = 1e-12);
        assert_relative_eq!(values[3].unwrap(), 0.52, epsilon = 1e-12);
    }

    #[test]
    fn cascade_order_district_then_province_then_global() {
        // Month 2 missing everywhere locally; district covers month 1 only,
        // province covers month 2, global catches the rest.
        let mut values = vec![None, None, None];
        let months = vec![1, 2, 3];
        let mut fb = FallbackMeans::default();
        fb.district[0] = Some(10.0);
        fb.province[0] = Some(99.0); // must lose to district
        fb.province[1] = Some(20.0);
        fb.global = Some(30.0);

        let summary = impute_series(&mut values, &months, 2, &fb).unwrap();
        assert_eq!(summary.district, 1);
        assert_eq!(summary.province, 1);
        assert_eq!(summary.global, 1);
        assert_eq!(values, vec![Some(10.0), Some(20.0), Some(30.0)]);
        assert!(summary.resolved);
    }

    #[test]
    fn degenerate_series_reported_unresolved() {
        let mut values = vec![None, None, None];
        let months = vec![1, 2, 3];
        let summary =
            impute_series(&mut values, &months, 2, &FallbackMeans::default()).unwrap();
        assert!(!summary.resolved);
        assert_eq!(summary.total_filled(), 0);
        assert!(values.iter().all(Option::is_none));
    }

    #[test]
    fn complete_series_is_noop() {
        let mut values: Vec<Option<f64>> = (1..=12).map(|m| Some(m as f64)).collect();
        let before = values.clone();
        let months: Vec<u8> = (1..=12).collect();
        let summary =
            impute_series(&mut values, &months, 2, &FallbackMeans::default()).unwrap();
        assert_eq!(summary.total_filled(), 0);
        assert!(summary.resolved);
        assert_eq!(values, before);
    }
}
