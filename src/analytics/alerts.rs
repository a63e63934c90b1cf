//! Alert Engine
//!
//! Pure evaluation of configured threshold conditions against the latest
//! signal values. No side effects and no history: the state is recomputed
//! from scratch on every call, and callers log or persist it externally.

use serde::{Deserialize, Serialize};

/// Alert thresholds. The z-score condition is always active; the spread
/// and correlation conditions are individually switchable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Trigger when `|z| > z_threshold`.
    pub z_threshold: f64,
    pub spread_enabled: bool,
    /// Trigger when `|spread| > spread_threshold` (if enabled).
    pub spread_threshold: f64,
    pub corr_enabled: bool,
    /// Trigger when the rolling correlation drops below this (if enabled).
    pub min_corr: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            z_threshold: 2.0,
            spread_enabled: false,
            spread_threshold: 100.0,
            corr_enabled: false,
            min_corr: 0.7,
        }
    }
}

/// Snapshot of triggered conditions for the most recent timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AlertState {
    pub z_alert: bool,
    pub spread_alert: bool,
    pub corr_alert: bool,
    /// OR of the enabled, triggered conditions.
    pub any: bool,
}

/// Evaluate all alert conditions. Undefined inputs never trigger.
pub fn evaluate(
    latest_z: Option<f64>,
    latest_spread: Option<f64>,
    latest_corr: Option<f64>,
    cfg: &AlertConfig,
) -> AlertState {
    let z_alert = latest_z.is_some_and(|z| z.abs() > cfg.z_threshold);
    let spread_alert = cfg.spread_enabled
        && latest_spread.is_some_and(|s| s.abs() > cfg.spread_threshold);
    let corr_alert = cfg.corr_enabled && latest_corr.is_some_and(|c| c < cfg.min_corr);

    AlertState {
        z_alert,
        spread_alert,
        corr_alert,
        any: z_alert || spread_alert || corr_alert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_alert_triggers_on_magnitude() {
        let cfg = AlertConfig::default();
        assert!(evaluate(Some(2.5), None, None, &cfg).z_alert);
        assert!(evaluate(Some(-2.5), None, None, &cfg).z_alert);
        assert!(!evaluate(Some(1.5), None, None, &cfg).z_alert);
    }

    #[test]
    fn test_undefined_z_never_triggers() {
        let cfg = AlertConfig::default();
        let state = evaluate(None, None, None, &cfg);
        assert!(!state.z_alert);
        assert!(!state.any);
    }

    #[test]
    fn test_spread_alert_respects_enable_flag() {
        let mut cfg = AlertConfig {
            spread_threshold: 50.0,
            ..AlertConfig::default()
        };
        assert!(!evaluate(None, Some(80.0), None, &cfg).spread_alert);

        cfg.spread_enabled = true;
        assert!(evaluate(None, Some(80.0), None, &cfg).spread_alert);
        assert!(evaluate(None, Some(-80.0), None, &cfg).spread_alert);
        assert!(!evaluate(None, Some(30.0), None, &cfg).spread_alert);
    }

    #[test]
    fn test_corr_alert_on_drop_below_minimum() {
        let cfg = AlertConfig {
            corr_enabled: true,
            min_corr: 0.7,
            ..AlertConfig::default()
        };
        assert!(evaluate(None, None, Some(0.5), &cfg).corr_alert);
        assert!(!evaluate(None, None, Some(0.9), &cfg).corr_alert);
        assert!(!evaluate(None, None, None, &cfg).corr_alert);
    }

    #[test]
    fn test_any_is_or_of_triggered_conditions() {
        let cfg = AlertConfig {
            z_threshold: 2.0,
            spread_enabled: true,
            spread_threshold: 10.0,
            corr_enabled: true,
            min_corr: 0.5,
        };

        let state = evaluate(Some(3.0), Some(5.0), Some(0.9), &cfg);
        assert!(state.z_alert && !state.spread_alert && !state.corr_alert);
        assert!(state.any);

        let quiet = evaluate(Some(0.5), Some(5.0), Some(0.9), &cfg);
        assert!(!quiet.any);
    }
}
