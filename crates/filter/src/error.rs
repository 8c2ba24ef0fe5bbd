//! Error types for the gaia-filter crate.

/// Error type for all fallible operations in the gaia-filter crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// Returned when a physical range has min above max.
    #[error("invalid physical range: min {min} exceeds max {max}")]
    InvalidRange {
        /// Lower bound of the offending range.
        min: f64,
        /// Upper bound of the offending range.
        max: f64,
    },

    /// Returned when a bound is NaN.
    #[error("non-finite bound in physical range")]
    NonFiniteBound,
}
