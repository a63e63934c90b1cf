//! Spread & Z-Score Engine
//!
//! `spread_t = y_t - beta_t * x_t`, standardized by its rolling mean and
//! sample standard deviation over the trailing `window` spreads. The
//! z-score is `None` (never zero) until the window fills and whenever the
//! rolling std is zero; downstream consumers treat `None` as "no signal".

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::hedge::HedgeRatioEstimate;
use crate::analytics::rolling::RollingWindow;
use crate::domain::AlignedPair;

/// One point of the standardized spread series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadZScorePoint {
    pub timestamp: DateTime<Utc>,
    pub spread: f64,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    pub z: Option<f64>,
}

/// Compute the spread and rolling z-score over an aligned pair.
///
/// The hedge ratio is broadcast (static) or aligned by position
/// (time-varying, estimated over the same pair). `window` must be >= 2;
/// the configuration layer enforces this.
pub fn spread_zscore(
    pair: &AlignedPair,
    estimate: &HedgeRatioEstimate,
    window: usize,
) -> Vec<SpreadZScorePoint> {
    debug_assert!(window >= 2, "rolling window must be >= 2");

    let betas = estimate.betas(pair.len());
    let mut acc = RollingWindow::new(window);
    let mut points = Vec::with_capacity(pair.len());

    for (i, &ts) in pair.timestamps().iter().enumerate() {
        let spread = pair.y()[i] - betas[i] * pair.x()[i];
        let stats = acc.push(spread);

        let (rolling_mean, rolling_std, z) = match stats {
            Some(s) if s.std > 0.0 => {
                (Some(s.mean), Some(s.std), Some((spread - s.mean) / s.std))
            }
            Some(s) => (Some(s.mean), Some(s.std), None),
            None => (None, None, None),
        };

        points.push(SpreadZScorePoint {
            timestamp: ts,
            spread,
            rolling_mean,
            rolling_std,
            z,
        });
    }

    points
}

/// Raw spread values of a computed series (stationarity-test input).
pub fn spread_values(points: &[SpreadZScorePoint]) -> Vec<f64> {
    points.iter().map(|p| p.spread).collect()
}
