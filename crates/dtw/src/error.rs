//! Error types for the gaia-dtw crate.

/// Error type for all fallible operations in the gaia-dtw crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtwError {
    /// Returned when either input sequence is empty.
    #[error("empty input: {input}")]
    EmptyInput {
        /// Name of the empty sequence.
        input: &'static str,
    },

    /// Returned when an input sequence contains NaN or infinity.
    #[error("non-finite value in {input}")]
    NonFiniteInput {
        /// Name of the sequence containing the non-finite value.
        input: &'static str,
    },

    /// Returned when a threshold model parameter is invalid.
    #[error("invalid threshold parameter {name}: {value}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
}
