//! Statistical helper functions shared across the Gaia pipeline.
//!
//! Statistics that can be undefined (empty sample, sample too small) return
//! `Option<f64>` rather than a sentinel, so downstream aggregation can
//! exclude them instead of averaging in zeros.

/// Arithmetic mean of a slice. Returns `None` if empty.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let sum: f64 = data.iter().sum();
    Some(sum / data.len() as f64)
}

/// Sample variance with N-1 denominator (matching pandas' `var()`).
/// Returns `None` if fewer than 2 elements.
pub fn variance(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    Some(data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0))
}

/// Sample standard deviation with N-1 denominator (matching pandas' `std()`).
/// Returns `None` if fewer than 2 elements.
pub fn sd(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// R's default quantile algorithm (type=7), the same linear-interpolation
/// scheme pandas uses for `Series.quantile`.
///
/// **Expects pre-sorted input** (caller's responsibility).
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "quantile_type7: input must not be empty"
    );
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Median of pre-sorted data. For even length, averages the middle two values.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "median: input must not be empty");
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Trimmed mean: drop `floor(n * trim_ratio)` values from each end of the
/// sorted sample, then average the rest (matching scipy's `trim_mean`).
///
/// `trim_ratio` must be in `[0, 0.5)`. Returns `None` if `data` is empty.
pub fn trimmed_mean(data: &[f64], trim_ratio: f64) -> Option<f64> {
    assert!(
        (0.0..0.5).contains(&trim_ratio),
        "trimmed_mean: trim_ratio must be in [0, 0.5), got {trim_ratio}"
    );
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let k = (sorted.len() as f64 * trim_ratio).floor() as usize;
    let kept = &sorted[k..sorted.len() - k];
    mean(kept)
}

/// Tukey fences `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]` of pre-sorted data.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn iqr_fences(sorted: &[f64]) -> (f64, f64) {
    let q1 = quantile_type7(sorted, 0.25);
    let q3 = quantile_type7(sorted, 0.75);
    let iqr = q3 - q1;
    (q1 - 1.5 * iqr, q3 + 1.5 * iqr)
}
