//! Pipeline orchestration.
//!
//! `PairAnalyzer` reproduces the reference analytics flow over a snapshot
//! of two bar series: liquidity filter, timestamp alignment, hedge-ratio
//! estimation, spread/z-score, stationarity test, correlation analysis,
//! alert evaluation and the flat export table. The backtest runs on demand
//! over the computed z-score series.

use tracing::{debug, info};

use crate::analytics::alerts::AlertState;
use crate::analytics::backtest::{run_on_spread, BacktestResult};
use crate::analytics::correlation::{correlation_analysis, CorrelationResult};
use crate::analytics::hedge::HedgeRatioEstimate;
use crate::analytics::report::{build_rows, ols_r2, AnalyticsRow};
use crate::analytics::spread::{spread_values, spread_zscore, SpreadZScorePoint};
use crate::analytics::stationarity::{adf_test, StationarityResult};
use crate::analytics::{alerts, AlertConfig};
use crate::config::Config;
use crate::domain::{AlignedPair, AnalyticsError, BarSeries};
use crate::ingestion::liquidity_filter;

/// Minimum overlapping bars for meaningful pair analytics.
const MIN_OVERLAP: usize = 5;

/// Everything one analysis pass produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub aligned_len: usize,
    /// Window actually used: `min(rolling_window, aligned_len - 1)`.
    pub effective_window: usize,
    pub hedge: HedgeRatioEstimate,
    pub spread_z: Vec<SpreadZScorePoint>,
    /// `None` when the spread is too short for the configured ADF minimum.
    pub stationarity: Option<StationarityResult>,
    pub correlation: CorrelationResult,
    pub r_squared: Option<f64>,
    pub alert_state: AlertState,
    pub rows: Vec<AnalyticsRow>,
}

impl AnalysisReport {
    pub fn latest_z(&self) -> Option<f64> {
        self.spread_z.last().and_then(|p| p.z)
    }

    pub fn latest_beta(&self) -> Option<f64> {
        self.hedge.latest()
    }
}

/// Runs the full analytics pipeline for one configured pair.
///
/// Holds no state between invocations: every call works on the snapshot it
/// is handed and returns fresh values, so repeated analysis of the same
/// snapshot is idempotent.
#[derive(Debug, Clone)]
pub struct PairAnalyzer {
    config: Config,
}

impl PairAnalyzer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze a snapshot of the two bar series.
    ///
    /// Fails only when fewer than 5 overlapping bars exist or the hedge
    /// estimation is degenerate; partial signals (warm-up z, short ADF
    /// window) are carried as `None` values inside the report.
    pub fn analyze(
        &self,
        bars_y: &BarSeries,
        bars_x: &BarSeries,
    ) -> Result<AnalysisReport, AnalyticsError> {
        let min_volume = self.config.resample.min_volume;
        let bars_y = liquidity_filter(bars_y, min_volume);
        let bars_x = liquidity_filter(bars_x, min_volume);

        let pair = AlignedPair::from_series(&bars_y, &bars_x);
        if pair.len() < MIN_OVERLAP {
            return Err(AnalyticsError::insufficient(MIN_OVERLAP, pair.len()));
        }

        // Clamp the window so short histories still produce a signal
        let effective_window = self
            .config
            .analytics
            .rolling_window
            .min(pair.len() - 1)
            .max(2);
        if effective_window < self.config.analytics.rolling_window {
            debug!(
                configured = self.config.analytics.rolling_window,
                effective = effective_window,
                "rolling window clamped to available history"
            );
        }

        let hedge = self.config.estimator().estimate(&pair)?;
        let spread_z = spread_zscore(&pair, &hedge, effective_window);

        let spreads = spread_values(&spread_z);
        let stationarity = match adf_test(&spreads, &self.config.adf()) {
            Ok(result) => Some(result),
            Err(AnalyticsError::InsufficientData { required, actual }) => {
                debug!(required, actual, "spread too short for ADF test");
                None
            }
            Err(other) => return Err(other),
        };

        let correlation = correlation_analysis(
            &pair,
            effective_window,
            self.config.analytics.max_lag,
        );
        let r_squared = ols_r2(&pair);

        let alert_cfg: AlertConfig = self.config.alert_config();
        let alert_state = alerts::evaluate(
            spread_z.last().and_then(|p| p.z),
            spread_z.last().map(|p| p.spread),
            correlation.rolling.last().and_then(|p| p.corr),
            &alert_cfg,
        );

        let rows = build_rows(&spread_z, &hedge, &correlation, &alert_cfg);

        info!(
            pair = %format!(
                "{}/{}",
                self.config.pair.symbol_y, self.config.pair.symbol_x
            ),
            aligned = pair.len(),
            beta = hedge.latest(),
            adf_p = stationarity.as_ref().and_then(|s| s.p_value),
            latest_z = spread_z.last().and_then(|p| p.z),
            any_alert = alert_state.any,
            "pair analysis complete"
        );

        Ok(AnalysisReport {
            aligned_len: pair.len(),
            effective_window,
            hedge,
            spread_z,
            stationarity,
            correlation,
            r_squared,
            alert_state,
            rows,
        })
    }

    /// Simulate the mean-reversion rule over a report's z-score series.
    pub fn backtest(&self, report: &AnalysisReport) -> BacktestResult {
        run_on_spread(&report.spread_z, &self.config.backtest_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HedgeMethod;
    use crate::domain::OhlcBar;
    use chrono::{TimeZone, Utc};

    fn bar(secs: i64, close: f64, volume: f64) -> OhlcBar {
        OhlcBar {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    fn correlated_series(n: usize) -> (BarSeries, BarSeries) {
        // x drifts deterministically, y tracks 1.5x with a bounded wobble
        let mut ys = Vec::new();
        let mut xs = Vec::new();
        for i in 0..n {
            let t = i as i64 * 60;
            let x = 2000.0 + (i as f64 * 0.31).sin() * 20.0 + i as f64 * 0.05;
            let y = 1.5 * x + (i as f64 * 1.7).sin() * 4.0;
            xs.push(bar(t, x, 10.0));
            ys.push(bar(t, y, 10.0));
        }
        (BarSeries::from_bars(ys), BarSeries::from_bars(xs))
    }

    #[test]
    fn test_analyze_happy_path() {
        let (bars_y, bars_x) = correlated_series(120);
        let analyzer = PairAnalyzer::new(Config::default());

        let report = analyzer.analyze(&bars_y, &bars_x).unwrap();
        assert_eq!(report.aligned_len, 120);
        assert_eq!(report.effective_window, 50);
        assert_eq!(report.rows.len(), 120);

        let beta = report.latest_beta().unwrap();
        assert!((beta - 1.5).abs() < 0.05, "beta = {beta}");
        assert!(report.r_squared.unwrap() > 0.95);
        assert!(report.stationarity.is_some());
    }

    #[test]
    fn test_analyze_rejects_thin_overlap() {
        let (bars_y, bars_x) = correlated_series(3);
        let analyzer = PairAnalyzer::new(Config::default());
        assert!(matches!(
            analyzer.analyze(&bars_y, &bars_x),
            Err(AnalyticsError::InsufficientData { required: 5, .. })
        ));
    }

    #[test]
    fn test_window_clamped_to_history() {
        let (bars_y, bars_x) = correlated_series(30);
        let analyzer = PairAnalyzer::new(Config::default());
        let report = analyzer.analyze(&bars_y, &bars_x).unwrap();
        // 50 configured, 30 bars available
        assert_eq!(report.effective_window, 29);
    }

    #[test]
    fn test_kalman_pipeline_produces_time_varying_beta() {
        let (bars_y, bars_x) = correlated_series(150);
        let mut config = Config::default();
        config.analytics.hedge_method = HedgeMethod::Kalman;
        let analyzer = PairAnalyzer::new(config);

        let report = analyzer.analyze(&bars_y, &bars_x).unwrap();
        match &report.hedge {
            HedgeRatioEstimate::TimeVarying(points) => assert_eq!(points.len(), 150),
            other => panic!("expected time-varying estimate, got {other:?}"),
        }
        let beta = report.latest_beta().unwrap();
        assert!((beta - 1.5).abs() < 0.1, "beta = {beta}");
    }

    #[test]
    fn test_liquidity_filter_applied_before_alignment() {
        let (bars_y, mut xs) = correlated_series(60);
        // Starve one x bar of volume; the matching timestamp must vanish
        let mut bars = xs.bars().to_vec();
        bars[10].volume = 0.5;
        xs = BarSeries::from_bars(bars);

        let mut config = Config::default();
        config.resample.min_volume = 1.0;
        let analyzer = PairAnalyzer::new(config);

        let report = analyzer.analyze(&bars_y, &xs).unwrap();
        assert_eq!(report.aligned_len, 59);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let (bars_y, bars_x) = correlated_series(100);
        let analyzer = PairAnalyzer::new(Config::default());

        let a = analyzer.analyze(&bars_y, &bars_x).unwrap();
        let b = analyzer.analyze(&bars_y, &bars_x).unwrap();
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.hedge, b.hedge);

        let bt_a = analyzer.backtest(&a);
        let bt_b = analyzer.backtest(&b);
        assert_eq!(bt_a, bt_b);
    }
}
