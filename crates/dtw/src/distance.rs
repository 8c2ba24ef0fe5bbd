//! Classic dynamic time warping distance.

use crate::error::DtwError;

/// Unconstrained DTW distance with absolute-difference point cost.
///
/// Conceptually: cost matrix `C[i][j] = |x[i] - y[j]|`, accumulated matrix
/// `D` of size `(N+1) x (M+1)` with `D[0][0] = 0` and +inf borders, and the
/// recurrence
///
/// ```text
/// D[i][j] = C[i-1][j-1] + min(D[i-1][j], D[i][j-1], D[i-1][j-1])
/// ```
///
/// The distance is `D[N][M]`. No warping window; the two sequences need not
/// have the same length. Only two rows of `D` are kept in memory.
///
/// # Errors
///
/// Returns [`DtwError::EmptyInput`] if either sequence is empty, or
/// [`DtwError::NonFiniteInput`] if either contains NaN or infinity.
pub fn dtw_distance(x: &[f64], y: &[f64]) -> Result<f64, DtwError> {
    if x.is_empty() {
        return Err(DtwError::EmptyInput { input: "x" });
    }
    if y.is_empty() {
        return Err(DtwError::EmptyInput { input: "y" });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(DtwError::NonFiniteInput { input: "x" });
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(DtwError::NonFiniteInput { input: "y" });
    }

    let m = y.len();
    let mut prev = vec![f64::INFINITY; m + 1];
    let mut curr = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;

    for &xi in x {
        curr[0] = f64::INFINITY;
        for j in 1..=m {
            let cost = (xi - y[j - 1]).abs();
            curr[j] = cost + prev[j].min(curr[j - 1]).min(prev[j - 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    Ok(prev[m])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn worked_example_three_points() {
        // X = [0,0,0], Y = [0,1,0]: C = [[0,1,0]; 3], minimal path cost 1.
        let d = dtw_distance(&[0.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).unwrap();
        assert_relative_eq!(d, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn self_distance_is_zero() {
        let x = [0.4, 0.42, 0.46, 0.5, 0.52, 0.54, 0.52, 0.5, 0.48, 0.44, 0.42, 0.4];
        let d = dtw_distance(&x, &x).unwrap();
        assert_relative_eq!(d, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn distance_is_non_negative() {
        let x = [1.0, 2.0, 3.0];
        let y = [3.0, 1.0, 2.0];
        assert!(dtw_distance(&x, &y).unwrap() >= 0.0);
        assert!(dtw_distance(&y, &x).unwrap() >= 0.0);
    }

    #[test]
    fn constant_offset_accumulates() {
        // Identical shapes offset by 1: warping aligns 2-2 and 3-3 for
        // free, paying only at the two ends.
        let d = dtw_distance(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(d, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn warping_absorbs_time_shift() {
        // The same peak shifted by one step: warping aligns it for free
        // except at the edges.
        let x = [0.0, 1.0, 0.0, 0.0];
        let y = [0.0, 0.0, 1.0, 0.0];
        let d = dtw_distance(&x, &y).unwrap();
        assert_relative_eq!(d, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn unequal_lengths_supported() {
        let d = dtw_distance(&[0.0, 1.0], &[0.0, 0.5, 1.0]).unwrap();
        assert_relative_eq!(d, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn single_point_pair() {
        let d = dtw_distance(&[2.0], &[5.0]).unwrap();
        assert_relative_eq!(d, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!(
            dtw_distance(&[], &[1.0]).unwrap_err(),
            DtwError::EmptyInput { input: "x" }
        );
        assert_eq!(
            dtw_distance(&[1.0], &[]).unwrap_err(),
            DtwError::EmptyInput { input: "y" }
        );
    }

    #[test]
    fn non_finite_rejected() {
        assert_eq!(
            dtw_distance(&[f64::NAN], &[1.0]).unwrap_err(),
            DtwError::NonFiniteInput { input: "x" }
        );
        assert_eq!(
            dtw_distance(&[1.0], &[f64::INFINITY]).unwrap_err(),
            DtwError::NonFiniteInput { input: "y" }
        );
    }
}
