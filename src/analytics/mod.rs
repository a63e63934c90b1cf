//! The analytics core: hedge-ratio estimation, spread/z-score, stationarity
//! testing, correlation, alerting and the mean-reversion backtest.
//!
//! Every computation here is synchronous, single-threaded and deterministic
//! given its inputs: each call takes an immutable snapshot of the bar data
//! and returns a fresh value, so recomputation over a refreshed snapshot is
//! idempotent. Nothing in this module performs I/O or holds shared state.

pub mod alerts;
pub mod backtest;
pub mod correlation;
pub mod hedge;
pub mod report;
pub mod rolling;
pub mod spread;
pub mod stationarity;

pub use alerts::{AlertConfig, AlertState};
pub use backtest::{BacktestConfig, BacktestResult, Position};
pub use correlation::{correlation_analysis, CorrelationResult};
pub use hedge::{HedgeEstimator, HedgeRatioEstimate, HuberConfig, KalmanConfig};
pub use report::{build_rows, ols_r2, AnalyticsRow};
pub use spread::{spread_zscore, SpreadZScorePoint};
pub use stationarity::{adf_test, AdfConfig, StationarityResult};
