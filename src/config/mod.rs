//! Configuration Loader
//!
//! Loads and validates the analytics configuration from TOML. The core
//! engines consume plain values; this module is the only place that knows
//! about files.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::analytics::alerts::AlertConfig;
use crate::analytics::backtest::BacktestConfig;
use crate::analytics::hedge::{HedgeEstimator, HuberConfig, KalmanConfig};
use crate::analytics::stationarity::AdfConfig;
use crate::domain::ResampleInterval;

/// Main configuration structure matching config.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pair: PairSection,
    pub resample: ResampleSection,
    pub analytics: AnalyticsSection,
    #[serde(default)]
    pub alerts: AlertsSection,
    #[serde(default)]
    pub backtest: BacktestSection,
}

/// Instrument pair under analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct PairSection {
    /// Dependent (Y) leg symbol.
    pub symbol_y: String,
    /// Hedge (X) leg symbol.
    pub symbol_x: String,
}

/// Tick-to-bar resampling section.
#[derive(Debug, Clone, Deserialize)]
pub struct ResampleSection {
    /// Bar interval: "1s", "1m" or "5m".
    pub interval: ResampleInterval,
    /// Drop bars with volume below this; 0 disables the filter.
    #[serde(default)]
    pub min_volume: f64,
}

/// Hedge-ratio estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HedgeMethod {
    Huber,
    Kalman,
}

/// Analytics section.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsSection {
    /// Window for z-score and rolling correlation, 20..=200 bars.
    pub rolling_window: usize,
    pub hedge_method: HedgeMethod,
    /// Kalman sub-parameters (used when `hedge_method = "kalman"`).
    #[serde(default)]
    pub kalman: KalmanConfig,
    /// Minimum spread length for the ADF test.
    #[serde(default = "default_adf_min_samples")]
    pub adf_min_samples: usize,
    /// Lagged differences in the ADF augmentation.
    #[serde(default = "default_adf_lags")]
    pub adf_lags: usize,
    /// Symmetric cross-correlation lag range.
    #[serde(default = "default_max_lag")]
    pub max_lag: usize,
}

fn default_adf_min_samples() -> usize {
    20
}

fn default_adf_lags() -> usize {
    1
}

fn default_max_lag() -> usize {
    20
}

/// Alerts section.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsSection {
    /// Alert when `|z|` exceeds this, 1.0..=3.0.
    pub z_threshold: f64,
    #[serde(default)]
    pub spread_enabled: bool,
    #[serde(default = "default_spread_threshold")]
    pub spread_threshold: f64,
    #[serde(default)]
    pub corr_enabled: bool,
    #[serde(default = "default_min_corr")]
    pub min_corr: f64,
}

fn default_spread_threshold() -> f64 {
    100.0
}

fn default_min_corr() -> f64 {
    0.7
}

impl Default for AlertsSection {
    fn default() -> Self {
        Self {
            z_threshold: 2.0,
            spread_enabled: false,
            spread_threshold: default_spread_threshold(),
            corr_enabled: false,
            min_corr: default_min_corr(),
        }
    }
}

/// Backtest section.
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestSection {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            entry_threshold: 2.0,
            exit_threshold: 0.1,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pair.symbol_y == self.pair.symbol_x {
            return Err(ConfigError::ValidationError(
                "pair legs must be distinct symbols".into(),
            ));
        }

        if self.resample.min_volume < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_volume must be >= 0, got {}",
                self.resample.min_volume
            )));
        }

        let w = self.analytics.rolling_window;
        if !(20..=200).contains(&w) {
            return Err(ConfigError::ValidationError(format!(
                "rolling_window must be in [20, 200], got {w}"
            )));
        }

        let k = &self.analytics.kalman;
        if k.q < 0.0 || k.r <= 0.0 || k.p0 <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "kalman parameters require q >= 0, r > 0, p0 > 0, got q={}, r={}, p0={}",
                k.q, k.r, k.p0
            )));
        }

        if self.analytics.adf_min_samples < 10 {
            return Err(ConfigError::ValidationError(format!(
                "adf_min_samples must be >= 10, got {}",
                self.analytics.adf_min_samples
            )));
        }

        if self.analytics.max_lag == 0 {
            return Err(ConfigError::ValidationError(
                "max_lag must be >= 1".into(),
            ));
        }

        let z = self.alerts.z_threshold;
        if !(1.0..=3.0).contains(&z) {
            return Err(ConfigError::ValidationError(format!(
                "alerts.z_threshold must be in [1.0, 3.0], got {z}"
            )));
        }

        let bt = &self.backtest;
        if bt.exit_threshold < 0.0 || bt.entry_threshold <= bt.exit_threshold {
            return Err(ConfigError::ValidationError(format!(
                "backtest requires entry_threshold > exit_threshold >= 0, got entry={}, exit={}",
                bt.entry_threshold, bt.exit_threshold
            )));
        }

        Ok(())
    }

    /// Hedge estimator selected by this configuration.
    pub fn estimator(&self) -> HedgeEstimator {
        match self.analytics.hedge_method {
            HedgeMethod::Huber => HedgeEstimator::Huber(HuberConfig::default()),
            HedgeMethod::Kalman => HedgeEstimator::Kalman(self.analytics.kalman),
        }
    }

    pub fn adf(&self) -> AdfConfig {
        AdfConfig {
            min_samples: self.analytics.adf_min_samples,
            lags: self.analytics.adf_lags,
        }
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            z_threshold: self.alerts.z_threshold,
            spread_enabled: self.alerts.spread_enabled,
            spread_threshold: self.alerts.spread_threshold,
            corr_enabled: self.alerts.corr_enabled,
            min_corr: self.alerts.min_corr,
        }
    }

    pub fn backtest_config(&self) -> BacktestConfig {
        BacktestConfig {
            entry_threshold: self.backtest.entry_threshold,
            exit_threshold: self.backtest.exit_threshold,
        }
    }
}

impl Default for Config {
    /// Defaults mirroring the reference deployment: BTC/ETH perps at 1m
    /// bars, 50-bar window, Huber hedge ratio.
    fn default() -> Self {
        Self {
            pair: PairSection {
                symbol_y: "BTCUSDT".into(),
                symbol_x: "ETHUSDT".into(),
            },
            resample: ResampleSection {
                interval: ResampleInterval::OneMinute,
                min_volume: 0.0,
            },
            analytics: AnalyticsSection {
                rolling_window: 50,
                hedge_method: HedgeMethod::Huber,
                kalman: KalmanConfig::default(),
                adf_min_samples: default_adf_min_samples(),
                adf_lags: default_adf_lags(),
                max_lag: default_max_lag(),
            },
            alerts: AlertsSection::default(),
            backtest: BacktestSection::default(),
        }
    }
}
