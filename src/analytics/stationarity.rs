//! Stationarity Tester
//!
//! Augmented Dickey-Fuller unit-root test with a constant term: regress
//! `ds_t` on `[1, s_{t-1}, ds_{t-1}, ..., ds_{t-k}]` and take the t-ratio
//! on the `s_{t-1}` coefficient. P-values come from the MacKinnon (1994)
//! regression-surface approximation for the constant-only case; critical
//! values from the MacKinnon (2010) finite-sample response surface.
//!
//! A low p-value rejects the unit root, i.e. the spread behaves as
//! mean-reverting. A constant spread or singular regression is not a fatal
//! error: the result carries `p_value = None` and `is_stationary = false`.

use serde::Serialize;
use statrs::function::erf::erf;
use tracing::debug;

use crate::domain::AnalyticsError;

/// MacKinnon (1994) tau bounds and polynomial coefficients, one series,
/// regression with constant.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// ADF configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfConfig {
    /// Reject inputs shorter than this many points.
    pub min_samples: usize,
    /// Number of lagged differences in the augmentation.
    pub lags: usize,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            min_samples: 20,
            lags: 1,
        }
    }
}

/// Tabulated critical values at the conventional significance levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

/// Outcome of the unit-root test over one spread window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StationarityResult {
    /// ADF t-statistic; `None` when the regression was degenerate.
    pub statistic: Option<f64>,
    /// MacKinnon approximate p-value; `None` when degenerate.
    pub p_value: Option<f64>,
    pub critical_values: CriticalValues,
    /// `p_value < 0.05`; false when the p-value is undefined.
    pub is_stationary: bool,
}

/// Run the ADF test over a spread window.
///
/// Errors only when the window is shorter than the configured minimum or
/// too short for the requested lag order; degenerate regressions return a
/// result with `p_value = None` instead of an error.
pub fn adf_test(spread: &[f64], cfg: &AdfConfig) -> Result<StationarityResult, AnalyticsError> {
    let n = spread.len();
    if n < cfg.min_samples {
        return Err(AnalyticsError::insufficient(cfg.min_samples, n));
    }
    // nobs = n - lags - 1 regression rows against lags + 2 coefficients
    let n_coef = cfg.lags + 2;
    let nobs = n.saturating_sub(cfg.lags + 1);
    if nobs <= n_coef + 1 {
        return Err(AnalyticsError::insufficient(n_coef + cfg.lags + 3, n));
    }

    let critical_values = mackinnon_crit(nobs);

    let degenerate = |reason: &str| {
        debug!(reason, "adf regression degenerate");
        StationarityResult {
            statistic: None,
            p_value: None,
            critical_values,
            is_stationary: false,
        }
    };

    if spread.iter().all(|&v| v == spread[0]) {
        return Ok(degenerate("constant spread"));
    }

    // First differences
    let ds: Vec<f64> = spread.windows(2).map(|w| w[1] - w[0]).collect();

    // Design matrix rows: [1, s_{t-1}, ds_{t-1}, ..., ds_{t-k}]
    let mut xtx = vec![vec![0.0; n_coef]; n_coef];
    let mut xty = vec![0.0; n_coef];
    let mut rows: Vec<(Vec<f64>, f64)> = Vec::with_capacity(nobs);

    for t in (cfg.lags + 1)..n {
        let mut row = Vec::with_capacity(n_coef);
        row.push(1.0);
        row.push(spread[t - 1]);
        for j in 1..=cfg.lags {
            // ds index i holds s[i+1] - s[i]
            row.push(ds[t - 1 - j]);
        }
        let dep = ds[t - 1];

        for i in 0..n_coef {
            for j in 0..n_coef {
                xtx[i][j] += row[i] * row[j];
            }
            xty[i] += row[i] * dep;
        }
        rows.push((row, dep));
    }

    let coef = match solve_linear(&xtx, &xty) {
        Some(c) => c,
        None => return Ok(degenerate("singular normal equations")),
    };

    // Residual variance and the standard error of the s_{t-1} coefficient
    let rss: f64 = rows
        .iter()
        .map(|(row, dep)| {
            let fitted: f64 = row.iter().zip(&coef).map(|(r, c)| r * c).sum();
            (dep - fitted) * (dep - fitted)
        })
        .sum();
    let dof = nobs - n_coef;
    let sigma2 = rss / dof as f64;

    let mut unit = vec![0.0; n_coef];
    unit[1] = 1.0;
    let inv_col = match solve_linear(&xtx, &unit) {
        Some(c) => c,
        None => return Ok(degenerate("singular normal equations")),
    };
    let var_b = sigma2 * inv_col[1];
    if var_b <= 0.0 || !var_b.is_finite() {
        return Ok(degenerate("non-positive coefficient variance"));
    }

    let statistic = coef[1] / var_b.sqrt();
    let p_value = mackinnon_pvalue(statistic);

    Ok(StationarityResult {
        statistic: Some(statistic),
        p_value: Some(p_value),
        critical_values,
        is_stationary: p_value < 0.05,
    })
}

/// Gaussian elimination with partial pivoting; `None` if singular.
fn solve_linear(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    let mut m: Vec<Vec<f64>> = a
        .iter()
        .zip(b)
        .map(|(row, &rhs)| {
            let mut r = row.clone();
            r.push(rhs);
            r
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                m[i][col]
                    .abs()
                    .partial_cmp(&m[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        if m[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = m[row][col] / m[col][col];
            for k in col..=n {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut acc = m[col][n];
        for k in (col + 1)..n {
            acc -= m[col][k] * x[k];
        }
        x[col] = acc / m[col][col];
    }
    Some(x)
}

fn norm_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// MacKinnon (1994) approximate asymptotic p-value for the tau statistic.
fn mackinnon_pvalue(stat: f64) -> f64 {
    if stat > TAU_MAX {
        return 1.0;
    }
    if stat < TAU_MIN {
        return 0.0;
    }
    let poly = if stat <= TAU_STAR {
        TAU_SMALLP[0] + TAU_SMALLP[1] * stat + TAU_SMALLP[2] * stat * stat
    } else {
        TAU_LARGEP[0]
            + TAU_LARGEP[1] * stat
            + TAU_LARGEP[2] * stat * stat
            + TAU_LARGEP[3] * stat * stat * stat
    };
    norm_cdf(poly)
}

/// MacKinnon (2010) finite-sample critical values, constant case.
fn mackinnon_crit(nobs: usize) -> CriticalValues {
    let n = nobs as f64;
    CriticalValues {
        one_pct: -3.43035 - 6.5393 / n - 16.786 / (n * n) - 79.433 / (n * n * n),
        five_pct: -2.86154 - 2.8903 / n - 4.234 / (n * n) - 40.040 / (n * n * n),
        ten_pct: -2.56677 - 1.5384 / n - 2.809 / (n * n),
    }
}
