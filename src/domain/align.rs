//! Timestamp alignment of two bar series.
//!
//! All pairwise analytics (hedge ratio, spread, correlation) operate on the
//! subset of timestamps present in both series. Because each series is
//! already strictly increasing, the intersection is a single merge pass.

use chrono::{DateTime, Utc};

use super::bar::BarSeries;

/// Close prices of two symbols at their common timestamps.
///
/// Invariant: `timestamps` is strictly increasing with no duplicates, and
/// `y`, `x` have the same length as `timestamps`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    timestamps: Vec<DateTime<Utc>>,
    y: Vec<f64>,
    x: Vec<f64>,
}

impl AlignedPair {
    /// Intersect two bar series on timestamp, taking close prices.
    pub fn from_series(series_y: &BarSeries, series_x: &BarSeries) -> Self {
        let mut timestamps = Vec::new();
        let mut y = Vec::new();
        let mut x = Vec::new();

        let bars_y = series_y.bars();
        let bars_x = series_x.bars();
        let (mut i, mut j) = (0usize, 0usize);

        while i < bars_y.len() && j < bars_x.len() {
            let (ty, tx) = (bars_y[i].timestamp, bars_x[j].timestamp);
            if ty == tx {
                timestamps.push(ty);
                y.push(bars_y[i].close);
                x.push(bars_x[j].close);
                i += 1;
                j += 1;
            } else if ty < tx {
                i += 1;
            } else {
                j += 1;
            }
        }

        Self { timestamps, y, x }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Dependent-leg close prices.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Hedge-leg close prices.
    pub fn x(&self) -> &[f64] {
        &self.x
    }
}
