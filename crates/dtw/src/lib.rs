//! # gaia-dtw
//!
//! Seasonal-anomaly scoring via dynamic time warping: the distance between a
//! unit-year's 12-month curve and the unit's seasonal baseline, thresholded
//! against the distribution of distances to yield anomaly flags.
//!
//! A distance is only defined when both curves are fully defined; a
//! threshold is only defined when at least two distances are. Undefined
//! stays undefined all the way to the output; flags are tri-state, not
//! defaulted.

mod config;
mod distance;
mod error;
mod threshold;

pub use config::DtwConfig;
pub use distance::dtw_distance;
pub use error::DtwError;
pub use threshold::{
    MIN_HISTORY, ThresholdModel, ThresholdScope, YearFlags, Z_FLAG_SIGMA, flag_distances,
    threshold,
};
