//! Configuration for anomaly scoring.

use crate::error::DtwError;
use crate::threshold::{ThresholdModel, ThresholdScope};

/// Configuration for a DTW anomaly-scoring run.
///
/// # Example
///
/// ```
/// use gaia_dtw::{DtwConfig, ThresholdModel, ThresholdScope};
///
/// let config = DtwConfig::default()
///     .with_model(ThresholdModel::Percentile { p: 0.95 })
///     .with_scope(ThresholdScope::Global);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DtwConfig {
    /// How the cutoff is derived from the distance pool.
    model: ThresholdModel,
    /// Which pool the cutoff is derived from.
    scope: ThresholdScope,
}

impl DtwConfig {
    /// Sets the threshold model.
    pub fn with_model(mut self, model: ThresholdModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the threshold scope.
    pub fn with_scope(mut self, scope: ThresholdScope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns the threshold model.
    pub fn model(&self) -> &ThresholdModel {
        &self.model
    }

    /// Returns the threshold scope.
    pub fn scope(&self) -> ThresholdScope {
        self.scope
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidParameter`] if the model's parameters are
    /// invalid.
    pub fn validate(&self) -> Result<(), DtwError> {
        self.model.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local_mean_2_sigma() {
        let cfg = DtwConfig::default();
        assert_eq!(cfg.model(), &ThresholdModel::MeanStd { k: 2.0 });
        assert_eq!(cfg.scope(), ThresholdScope::Local);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_chaining() {
        let cfg = DtwConfig::default()
            .with_model(ThresholdModel::Iqr)
            .with_scope(ThresholdScope::Global);
        assert_eq!(cfg.model(), &ThresholdModel::Iqr);
        assert_eq!(cfg.scope(), ThresholdScope::Global);
    }

    #[test]
    fn validate_propagates_model_error() {
        let cfg = DtwConfig::default().with_model(ThresholdModel::Percentile { p: 2.0 });
        assert!(cfg.validate().is_err());
    }
}
