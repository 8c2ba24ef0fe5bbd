//! Anomaly thresholds over DTW distance samples.

use gaia_stats::{mean, quantile_type7, sd};

use crate::error::DtwError;

/// Minimum number of defined distances needed before any threshold or flag
/// is computed. With a single year of history there is no spread to measure.
pub const MIN_HISTORY: usize = 2;

/// Z-score cutoff for the secondary flag.
pub const Z_FLAG_SIGMA: f64 = 2.0;

/// How the anomaly cutoff is derived from a pool of DTW distances.
///
/// All three are variants of the same local-statistics pattern; which one a
/// stakeholder wants depends on how sensitive the flag should be to the
/// distance distribution's shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdModel {
    /// `mean + k * sd` (reference policy: k = 2).
    MeanStd {
        /// Multiplier on the standard deviation.
        k: f64,
    },
    /// Tukey upper fence: `Q3 + 1.5 * IQR`.
    Iqr,
    /// A fixed upper percentile of the pool (e.g. 0.95).
    Percentile {
        /// Quantile probability in (0, 1).
        p: f64,
    },
}

impl Default for ThresholdModel {
    fn default() -> Self {
        Self::MeanStd { k: 2.0 }
    }
}

impl ThresholdModel {
    /// Validates model parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidParameter`] if `k` is non-finite or
    /// negative, or `p` is outside (0, 1).
    pub fn validate(&self) -> Result<(), DtwError> {
        match *self {
            Self::MeanStd { k } => {
                if !k.is_finite() || k < 0.0 {
                    return Err(DtwError::InvalidParameter { name: "k", value: k });
                }
            }
            Self::Iqr => {}
            Self::Percentile { p } => {
                if !(0.0..1.0).contains(&p) || p == 0.0 {
                    return Err(DtwError::InvalidParameter {
                        name: "percentile",
                        value: p,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Whether the threshold statistics pool is the unit's own history or the
/// whole population of units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThresholdScope {
    /// Per (spatial unit, variable): "is this year unusual for this place?"
    #[default]
    Local,
    /// Per variable across all units: "is this unit-year unusual for the
    /// region?"
    Global,
}

/// Computes the anomaly cutoff from a pool of defined distances.
///
/// Returns `None` when the pool has fewer than [`MIN_HISTORY`] entries:
/// a threshold is never fabricated from a sample of one.
pub fn threshold(pool: &[f64], model: &ThresholdModel) -> Option<f64> {
    if pool.len() < MIN_HISTORY {
        return None;
    }
    match *model {
        ThresholdModel::MeanStd { k } => {
            let mu = mean(pool)?;
            let sigma = sd(pool)?;
            Some(mu + k * sigma)
        }
        ThresholdModel::Iqr => {
            let mut sorted = pool.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let q1 = quantile_type7(&sorted, 0.25);
            let q3 = quantile_type7(&sorted, 0.75);
            Some(q3 + 1.5 * (q3 - q1))
        }
        ThresholdModel::Percentile { p } => {
            let mut sorted = pool.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            Some(quantile_type7(&sorted, p))
        }
    }
}

/// Per-year threshold decision for one (spatial unit, variable).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearFlags {
    /// The cutoff the distance was compared against.
    pub threshold: Option<f64>,
    /// `distance > threshold`; undefined when either side is.
    pub flag: Option<bool>,
    /// Z-score of the distance against the unit's own history.
    pub z: Option<f64>,
    /// `z > 2.0`; undefined when z is.
    pub z_flag: Option<bool>,
}

/// Attaches threshold decisions to each year's distance.
///
/// `pool` is the distance sample the cutoff is derived from: the defined
/// entries of `distances` for [`ThresholdScope::Local`], or every unit's
/// distances for [`ThresholdScope::Global`]. The z-score always uses the
/// *local* mean/sd (the defined entries of `distances`), so the secondary
/// flag keeps answering "unusual for this place" under either scope.
///
/// Undefined inputs yield undefined outputs, never a default decision.
pub fn flag_distances(
    distances: &[Option<f64>],
    pool: &[f64],
    model: &ThresholdModel,
) -> Vec<YearFlags> {
    let cutoff = threshold(pool, model);

    let local: Vec<f64> = distances.iter().filter_map(|d| *d).collect();
    let (local_mu, local_sigma) = if local.len() < MIN_HISTORY {
        (None, None)
    } else {
        (mean(&local), sd(&local))
    };

    distances
        .iter()
        .map(|d| {
            let Some(dist) = *d else {
                return YearFlags::default();
            };
            let flag = cutoff.map(|t| dist > t);
            let z = match (local_mu, local_sigma) {
                (Some(mu), Some(sigma)) if sigma > 0.0 => Some((dist - mu) / sigma),
                _ => None,
            };
            let z_flag = z.map(|z| z > Z_FLAG_SIGMA);
            YearFlags {
                threshold: cutoff,
                flag,
                z,
                z_flag,
            }
        })
        .collect()
}
