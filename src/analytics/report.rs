//! Flat row-oriented analytics table and regression diagnostics.
//!
//! The display/export collaborator consumes one row per aligned timestamp
//! with `timestamp, beta, spread, z, rolling_corr` and the per-row alert
//! flags. Rows are `serde::Serialize`-able so they can be written to any
//! flat row-oriented sink.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::alerts::{self, AlertConfig, AlertState};
use crate::analytics::correlation::CorrelationResult;
use crate::analytics::hedge::HedgeRatioEstimate;
use crate::analytics::rolling::pearson;
use crate::analytics::spread::SpreadZScorePoint;
use crate::domain::AlignedPair;

/// One export row. Undefined values serialize as null.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalyticsRow {
    pub timestamp: DateTime<Utc>,
    pub beta: f64,
    pub spread: f64,
    pub z: Option<f64>,
    pub rolling_corr: Option<f64>,
    pub z_alert: bool,
    pub spread_alert: bool,
    pub corr_alert: bool,
}

impl AnalyticsRow {
    pub fn alert_state(&self) -> AlertState {
        AlertState {
            z_alert: self.z_alert,
            spread_alert: self.spread_alert,
            corr_alert: self.corr_alert,
            any: self.z_alert || self.spread_alert || self.corr_alert,
        }
    }
}

/// Zip the per-timestamp analytics into export rows, evaluating the alert
/// conditions against each row's own values.
pub fn build_rows(
    spread_z: &[SpreadZScorePoint],
    estimate: &HedgeRatioEstimate,
    correlation: &CorrelationResult,
    alert_cfg: &AlertConfig,
) -> Vec<AnalyticsRow> {
    let betas = estimate.betas(spread_z.len());
    debug_assert_eq!(spread_z.len(), correlation.rolling.len());

    spread_z
        .iter()
        .zip(&betas)
        .zip(&correlation.rolling)
        .map(|((point, &beta), corr_point)| {
            let state = alerts::evaluate(point.z, Some(point.spread), corr_point.corr, alert_cfg);
            AnalyticsRow {
                timestamp: point.timestamp,
                beta,
                spread: point.spread,
                z: point.z,
                rolling_corr: corr_point.corr,
                z_alert: state.z_alert,
                spread_alert: state.spread_alert,
                corr_alert: state.corr_alert,
            }
        })
        .collect()
}

/// R-squared of the OLS fit `y ~ alpha + beta * x` over the aligned pair.
///
/// For a simple regression with intercept this equals the squared Pearson
/// correlation. `None` when either leg is degenerate.
pub fn ols_r2(pair: &AlignedPair) -> Option<f64> {
    pearson(pair.y(), pair.x()).map(|r| r * r)
}
