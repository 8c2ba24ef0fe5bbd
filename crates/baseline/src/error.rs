//! Error types for the gaia-baseline crate.

/// Error type for all fallible operations in the gaia-baseline crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BaselineError {
    /// Returned when the trim ratio is outside `[0, 0.5)`.
    #[error("trim ratio must be in [0, 0.5), got {ratio}")]
    InvalidTrimRatio {
        /// The invalid ratio that was provided.
        ratio: f64,
    },

    /// Returned when the value and month axes differ in length.
    #[error("values length {values} does not match months length {months}")]
    LengthMismatch {
        /// Length of the value series.
        values: usize,
        /// Length of the calendar-month axis.
        months: usize,
    },

    /// Returned when the calendar-month axis contains an invalid month.
    #[error("invalid month {month} at index {index} (must be 1..=12)")]
    InvalidMonth {
        /// Position of the invalid entry.
        index: usize,
        /// The invalid month number.
        month: u8,
    },
}
