//! Per-calendar-month means and climatology fill.

/// Mean of the series' non-missing values for each calendar month.
///
/// Index 0 holds January, index 11 December. Months with no non-missing
/// sample stay `None`.
///
/// `values` and `months` must have equal length with months already
/// validated to 1..=12 (the caller's responsibility; see
/// [`crate::impute_series`]).
pub fn monthly_means(values: &[Option<f64>], months: &[u8]) -> [Option<f64>; 12] {
    let mut sums = [0.0_f64; 12];
    let mut counts = [0_usize; 12];

    for (v, &m) in values.iter().zip(months.iter()) {
        if let Some(x) = v {
            let i = (m - 1) as usize;
            sums[i] += x;
            counts[i] += 1;
        }
    }

    let mut means = [None; 12];
    for i in 0..12 {
        if counts[i] > 0 {
            means[i] = Some(sums[i] / counts[i] as f64);
        }
    }
    means
}

/// Fills still-missing slots from a per-calendar-month lookup, in place.
///
/// A slot is filled only when the lookup has a defined mean for its calendar
/// month. Returns the number of values filled.
pub fn fill_from_monthly(
    values: &mut [Option<f64>],
    months: &[u8],
    means: &[Option<f64>; 12],
) -> usize {
    let mut filled = 0;
    for (v, &m) in values.iter_mut().zip(months.iter()) {
        if v.is_none()
            && let Some(mean) = means[(m - 1) as usize]
        {
            *v = Some(mean);
            filled += 1;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn monthly_means_across_years() {
        // Two years of Jan/Feb data.
        let values = vec![Some(1.0), Some(10.0), Some(3.0), None];
        let months = vec![1, 2, 1, 2];
        let means = monthly_means(&values, &months);
        assert_relative_eq!(means[0].unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(means[1].unwrap(), 10.0, epsilon = 1e-12);
        assert!(means[2].is_none());
    }

    #[test]
    fn monthly_means_all_missing() {
        let values = vec![None, None];
        let months = vec![1, 2];
        let means = monthly_means(&values, &months);
        assert!(means.iter().all(Option::is_none));
    }

    #[test]
    fn fill_uses_calendar_month() {
        let mut values = vec![Some(1.0), None, None, Some(4.0)];
        let months = vec![1, 2, 1, 2];
        let mut means = [None; 12];
        means[0] = Some(1.5);
        means[1] = Some(4.5);
        let filled = fill_from_monthly(&mut values, &months, &means);
        assert_eq!(filled, 2);
        assert_relative_eq!(values[1].unwrap(), 4.5, epsilon = 1e-12);
        assert_relative_eq!(values[2].unwrap(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn fill_skips_undefined_months() {
        let mut values = vec![None, None];
        let months = vec![3, 4];
        let mut means = [None; 12];
        means[2] = Some(7.0);
        let filled = fill_from_monthly(&mut values, &months, &means);
        assert_eq!(filled, 1);
        assert_eq!(values, vec![Some(7.0), None]);
    }

    #[test]
    fn fill_never_overwrites_present() {
        let mut values = vec![Some(2.0)];
        let months = vec![1];
        let means = [Some(99.0); 12];
        let filled = fill_from_monthly(&mut values, &months, &means);
        assert_eq!(filled, 0);
        assert_eq!(values, vec![Some(2.0)]);
    }
}
