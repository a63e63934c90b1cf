//! Correlation Engine
//!
//! Rolling Pearson correlation of the two aligned close series plus a
//! lead-lag cross-correlation table. Cross-correlation at lag `l`
//! correlates `y_t` against `x_{t+l}` over the overlapping range, so a
//! positive best lag means the hedge leg leads the dependent leg. Lag 0 of
//! the table is exactly the whole-series Pearson correlation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::rolling::{pearson, rolling_corr};
use crate::domain::AlignedPair;

/// Rolling correlation at one timestamp; `None` until the window fills or
/// when either side has zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingCorrPoint {
    pub timestamp: DateTime<Utc>,
    pub corr: Option<f64>,
}

/// Cross-correlation at one lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagCorrelation {
    pub lag: i32,
    pub corr: Option<f64>,
}

/// Rolling and lead-lag correlation of one aligned pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    pub rolling: Vec<RollingCorrPoint>,
    /// One entry per lag in `[-max_lag, max_lag]`, ascending.
    pub lag_table: Vec<LagCorrelation>,
    /// Lag of maximal `|corr|`; ties break toward 0, then smallest `|lag|`.
    pub best_lag: Option<i32>,
}

impl CorrelationResult {
    /// Most recent defined rolling correlation.
    pub fn latest(&self) -> Option<f64> {
        self.rolling.iter().rev().find_map(|p| p.corr)
    }

    /// Cross-correlation at a given lag.
    pub fn at_lag(&self, lag: i32) -> Option<f64> {
        self.lag_table
            .iter()
            .find(|entry| entry.lag == lag)
            .and_then(|entry| entry.corr)
    }
}

/// Compute rolling correlation over `window` and the cross-correlation
/// table for lags in `[-max_lag, max_lag]`.
pub fn correlation_analysis(
    pair: &AlignedPair,
    window: usize,
    max_lag: usize,
) -> CorrelationResult {
    let rolling_values = rolling_corr(pair.y(), pair.x(), window);
    let rolling = pair
        .timestamps()
        .iter()
        .zip(rolling_values)
        .map(|(&timestamp, corr)| RollingCorrPoint { timestamp, corr })
        .collect();

    let lag_table = cross_corr(pair.y(), pair.x(), max_lag);
    let best_lag = pick_best_lag(&lag_table);

    CorrelationResult {
        rolling,
        lag_table,
        best_lag,
    }
}

/// Cross-correlation of `y_t` with `x_{t+lag}` over the overlapping range.
pub fn cross_corr(y: &[f64], x: &[f64], max_lag: usize) -> Vec<LagCorrelation> {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len();
    let max_lag = max_lag as i64;

    (-max_lag..=max_lag)
        .map(|lag| {
            let (y_slice, x_slice): (&[f64], &[f64]) = if lag >= 0 {
                let l = lag as usize;
                if l >= n {
                    (&[], &[])
                } else {
                    (&y[..n - l], &x[l..])
                }
            } else {
                let l = (-lag) as usize;
                if l >= n {
                    (&[], &[])
                } else {
                    (&y[l..], &x[..n - l])
                }
            };
            LagCorrelation {
                lag: lag as i32,
                corr: pearson(y_slice, x_slice),
            }
        })
        .collect()
}

fn pick_best_lag(table: &[LagCorrelation]) -> Option<i32> {
    table
        .iter()
        .filter_map(|entry| entry.corr.map(|c| (entry.lag, c.abs())))
        .max_by(|(lag_a, abs_a), (lag_b, abs_b)| {
            abs_a
                .partial_cmp(abs_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                // Prefer lag 0, then the smaller |lag|, on equal |corr|
                .then_with(|| (lag_b.abs()).cmp(&lag_a.abs()))
                .then_with(|| lag_b.cmp(lag_a))
        })
        .map(|(lag, _)| lag)
}
