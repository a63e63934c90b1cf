//! Error taxonomy for the analytics engines.
//!
//! Nothing here is fatal to the process: insufficient data is recovered
//! locally as `None`/empty values wherever the pipeline can proceed, a
//! failed estimate leaves prior valid estimates untouched, and a failed
//! stationarity test is carried inside the result as `p_value = None`.

use thiserror::Error;

/// Errors surfaced by the analytics core.
#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
    /// Fewer data points than the computation requires.
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Degenerate regression input or numeric divergence in the filter.
    #[error("estimation failed: {0}")]
    Estimation(String),

    /// Constant series or singular regression in the unit-root test.
    #[error("stationarity test failed: {0}")]
    StationarityTest(String),
}

impl AnalyticsError {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalyticsError::insufficient(20, 3);
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 20 points, got 3"
        );

        let err = AnalyticsError::Estimation("constant x leg".into());
        assert!(err.to_string().contains("constant x leg"));
    }
}
