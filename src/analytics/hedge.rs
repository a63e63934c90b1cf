//! Hedge-Ratio Estimator
//!
//! Two estimators behind one contract, selected by configuration:
//!
//! - **Huber**: robust regression of `y = beta * x` through the origin via
//!   iteratively reweighted least squares. The loss is quadratic for small
//!   residuals and linear beyond the tuning constant, downweighting
//!   outliers. Returns one static beta for the supplied window.
//! - **Kalman**: beta modeled as a random walk `beta_t = beta_{t-1} + w_t`
//!   with observation `y_t = beta_t * x_t + v_t`. Returns the full beta
//!   time series. The per-step state `(beta, P)` is threaded explicitly as
//!   an immutable value pair so each step is reproducible in isolation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{AlignedPair, AnalyticsError};

/// Huber tuning constant: 95% efficiency under Gaussian residuals.
const HUBER_K: f64 = 1.345;
/// IRLS convergence tolerance on the beta update.
const HUBER_TOL: f64 = 1e-8;
const HUBER_MAX_ITER: usize = 50;
/// Consistency factor relating MAD to the Gaussian standard deviation.
const MAD_SCALE: f64 = 1.4826;

/// Huber estimator parameters (currently none beyond the fixed tuning
/// constant; kept as a struct so the config surface can grow).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HuberConfig {}

/// Kalman filter parameters for the random-walk beta model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KalmanConfig {
    /// Process variance Q: how fast beta is allowed to drift.
    pub q: f64,
    /// Observation variance R: measurement noise of the price relation.
    pub r: f64,
    /// Initial beta estimate.
    pub beta0: f64,
    /// Initial estimation error covariance.
    pub p0: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            q: 1e-4,
            r: 0.01,
            beta0: 0.0,
            p0: 1.0,
        }
    }
}

/// One step of the time-varying estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaPoint {
    pub timestamp: DateTime<Utc>,
    pub beta: f64,
    /// Posterior estimation error covariance P at this step.
    pub covariance: f64,
}

/// Result of hedge-ratio estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum HedgeRatioEstimate {
    /// One scalar beta for the whole window (Huber).
    Static(f64),
    /// One `(timestamp, beta, covariance)` per aligned point (Kalman).
    TimeVarying(Vec<BetaPoint>),
}

impl HedgeRatioEstimate {
    /// Most recent beta.
    pub fn latest(&self) -> Option<f64> {
        match self {
            HedgeRatioEstimate::Static(beta) => Some(*beta),
            HedgeRatioEstimate::TimeVarying(points) => points.last().map(|p| p.beta),
        }
    }

    /// Beta per aligned point, broadcasting the static variant.
    ///
    /// The time-varying variant must have been estimated over the same
    /// aligned window of length `len`.
    pub fn betas(&self, len: usize) -> Vec<f64> {
        match self {
            HedgeRatioEstimate::Static(beta) => vec![*beta; len],
            HedgeRatioEstimate::TimeVarying(points) => {
                debug_assert_eq!(points.len(), len);
                points.iter().map(|p| p.beta).collect()
            }
        }
    }
}

/// Hedge-ratio estimation strategy, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HedgeEstimator {
    Huber(HuberConfig),
    Kalman(KalmanConfig),
}

impl HedgeEstimator {
    /// Estimate the hedge ratio over the aligned close prices.
    pub fn estimate(&self, pair: &AlignedPair) -> Result<HedgeRatioEstimate, AnalyticsError> {
        match self {
            HedgeEstimator::Huber(_) => huber_hedge_ratio(pair).map(HedgeRatioEstimate::Static),
            HedgeEstimator::Kalman(cfg) => {
                kalman_hedge_ratio(pair, cfg).map(HedgeRatioEstimate::TimeVarying)
            }
        }
    }
}

fn median_abs(values: &mut Vec<f64>) -> f64 {
    for v in values.iter_mut() {
        *v = v.abs();
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Robust static hedge ratio via IRLS with the Huber weight function.
pub fn huber_hedge_ratio(pair: &AlignedPair) -> Result<f64, AnalyticsError> {
    let (y, x) = (pair.y(), pair.x());
    let n = x.len();
    if n < 2 {
        return Err(AnalyticsError::insufficient(2, n));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let var_x = x.iter().map(|v| (v - mean_x) * (v - mean_x)).sum::<f64>();
    if var_x == 0.0 {
        return Err(AnalyticsError::Estimation(
            "hedge leg is constant over the window".into(),
        ));
    }

    // Unweighted least squares through the origin as the starting point
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    if sxx == 0.0 {
        return Err(AnalyticsError::Estimation(
            "hedge leg is identically zero".into(),
        ));
    }
    let mut beta = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum::<f64>() / sxx;

    for iter in 0..HUBER_MAX_ITER {
        let mut residuals: Vec<f64> = y
            .iter()
            .zip(x)
            .map(|(yi, xi)| yi - beta * xi)
            .collect();
        let scale = MAD_SCALE * median_abs(&mut residuals);
        if scale < 1e-12 {
            // Residuals are (numerically) zero: perfect fit
            break;
        }

        let mut swxy = 0.0;
        let mut swxx = 0.0;
        for (yi, xi) in y.iter().zip(x) {
            let u = (yi - beta * xi) / scale;
            let w = if u.abs() <= HUBER_K { 1.0 } else { HUBER_K / u.abs() };
            swxy += w * xi * yi;
            swxx += w * xi * xi;
        }
        if swxx <= 0.0 {
            return Err(AnalyticsError::Estimation(
                "degenerate weighted regression".into(),
            ));
        }

        let next = swxy / swxx;
        let delta = (next - beta).abs();
        beta = next;
        if delta < HUBER_TOL {
            debug!(beta, iterations = iter + 1, "huber regression converged");
            break;
        }
    }

    if !beta.is_finite() {
        return Err(AnalyticsError::Estimation("huber beta is not finite".into()));
    }
    Ok(beta)
}

/// Time-varying hedge ratio via the random-walk Kalman filter.
///
/// Runs strictly in time order; each step depends on the previous state.
pub fn kalman_hedge_ratio(
    pair: &AlignedPair,
    cfg: &KalmanConfig,
) -> Result<Vec<BetaPoint>, AnalyticsError> {
    if pair.is_empty() {
        return Err(AnalyticsError::insufficient(1, 0));
    }

    let mut points = Vec::with_capacity(pair.len());
    let mut state = (cfg.beta0, cfg.p0);

    for ((&y, &x), &ts) in pair
        .y()
        .iter()
        .zip(pair.x())
        .zip(pair.timestamps())
    {
        let (beta_prev, p_prev) = state;

        // Predict: beta unchanged under the random walk, covariance grows
        let p_pred = p_prev + cfg.q;

        // Update against the observation y = beta * x + v
        let innovation_var = x * x * p_pred + cfg.r;
        if innovation_var <= 0.0 {
            return Err(AnalyticsError::Estimation(
                "non-positive innovation variance".into(),
            ));
        }
        let gain = p_pred * x / innovation_var;
        let beta = beta_prev + gain * (y - x * beta_prev);
        let p = (1.0 - gain * x) * p_pred;

        if !beta.is_finite() || !p.is_finite() {
            return Err(AnalyticsError::Estimation(format!(
                "kalman filter diverged at {ts}"
            )));
        }

        points.push(BetaPoint {
            timestamp: ts,
            beta,
            covariance: p,
        });
        state = (beta, p);
    }

    Ok(points)
}
