//! Error types for the gaia-calendar crate.

/// Error type for all fallible operations in the gaia-calendar crate.
///
/// This enum covers validation failures for month numbers, study-period
/// bounds, and the structural invariants of the dense month grid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a month number is outside the valid range 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number that was provided.
        month: u8,
    },

    /// Returned when a study period ends before it starts.
    #[error("study period ends before it starts: {start_year}-{start_month:02} > {end_year}-{end_month:02}")]
    InvertedPeriod {
        /// Start year of the offending period.
        start_year: i32,
        /// Start month of the offending period.
        start_month: u8,
        /// End year of the offending period.
        end_year: i32,
        /// End month of the offending period.
        end_month: u8,
    },

    /// Returned when two observations land on the same month of the grid.
    #[error("duplicate observation for {year}-{month:02}")]
    DuplicateMonth {
        /// Year of the duplicated month.
        year: i32,
        /// Month of the duplicated month.
        month: u8,
    },

    /// Returned when an observation falls outside the study period.
    #[error("observation at {year}-{month:02} is outside the study period")]
    OutOfPeriod {
        /// Year of the stray observation.
        year: i32,
        /// Month of the stray observation.
        month: u8,
    },
}
