//! Statistical outlier removal via Tukey fences.

use gaia_stats::iqr_fences;

/// Minimum non-missing sample size for a stable IQR estimate. Below this the
/// outlier pass is skipped entirely.
pub const MIN_IQR_SAMPLE: usize = 5;

/// Replaces IQR outliers with missing, in place.
///
/// Computes Q1/Q3 (R type-7 quantiles) over the series' non-missing values
/// and deletes anything outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`. Skipped
/// (no-op) when fewer than [`MIN_IQR_SAMPLE`] values are present. Returns
/// the number of values removed.
pub fn remove_iqr_outliers(values: &mut [Option<f64>]) -> usize {
    let mut present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if present.len() < MIN_IQR_SAMPLE {
        return 0;
    }
    present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let (lower, upper) = iqr_fences(&present);

    let mut removed = 0;
    for slot in values.iter_mut() {
        if let Some(v) = *slot
            && (v < lower || v > upper)
        {
            *slot = None;
            removed += 1;
        }
    }
    removed
}
