//! # gaia-baseline
//!
//! Robust seasonal baselines: for one (spatial unit, variable), the trimmed
//! mean of every calendar month's values across all years of the cleaned
//! series. The trim keeps a single extreme year from dragging the seasonal
//! shape. A month with no samples stays undefined and downstream
//! computations that need it are skipped, never defaulted to zero.

mod error;

use gaia_stats::trimmed_mean;

pub use error::BaselineError;

/// Default fraction trimmed from each end of the sorted monthly sample.
pub const DEFAULT_TRIM_RATIO: f64 = 0.1;

/// A 12-element seasonal baseline, January at index 0.
pub type Baseline = [Option<f64>; 12];

/// Computes the seasonal baseline for one series.
///
/// For each calendar month, collects the series' non-missing values
/// observed in that month across all years and takes the trimmed mean
/// (dropping `floor(n * trim_ratio)` from each sorted end).
///
/// # Errors
///
/// Returns [`BaselineError::InvalidTrimRatio`] if `trim_ratio` is outside
/// `[0, 0.5)`, [`BaselineError::LengthMismatch`] if the axes differ in
/// length, or [`BaselineError::InvalidMonth`] for a month outside 1..=12.
pub fn seasonal_baseline(
    values: &[Option<f64>],
    months: &[u8],
    trim_ratio: f64,
) -> Result<Baseline, BaselineError> {
    if !(0.0..0.5).contains(&trim_ratio) {
        return Err(BaselineError::InvalidTrimRatio { ratio: trim_ratio });
    }
    if values.len() != months.len() {
        return Err(BaselineError::LengthMismatch {
            values: values.len(),
            months: months.len(),
        });
    }

    let mut samples: [Vec<f64>; 12] = Default::default();
    for (index, (v, &month)) in values.iter().zip(months.iter()).enumerate() {
        if !(1..=12).contains(&month) {
            return Err(BaselineError::InvalidMonth { index, month });
        }
        if let Some(x) = v {
            samples[(month - 1) as usize].push(*x);
        }
    }

    let mut baseline: Baseline = [None; 12];
    for (b, sample) in baseline.iter_mut().zip(samples.iter()) {
        *b = trimmed_mean(sample, trim_ratio);
    }
    Ok(baseline)
}

/// Whether every month of the baseline is defined.
pub fn is_complete(baseline: &Baseline) -> bool {
    baseline.iter().all(Option::is_some)
}
