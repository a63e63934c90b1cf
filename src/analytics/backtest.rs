//! Backtest Engine
//!
//! Deterministic state-machine simulation of the mean-reversion rule over
//! an ordered z-score series. PnL is measured in z-units: once a position
//! is held entering a bar, it accrues `(z_t - z_prev) * sign`. The bar that
//! opens a position accrues nothing, and bars with undefined z are skipped
//! entirely (no transition, no pnl).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::spread::SpreadZScorePoint;

/// Entry/exit thresholds; `entry_threshold > exit_threshold >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Open a position when `|z|` exceeds this.
    pub entry_threshold: f64,
    /// Close the position when `|z|` falls below this.
    pub exit_threshold: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            entry_threshold: 2.0,
            exit_threshold: 0.1,
        }
    }
}

/// Position in the spread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Position {
    #[default]
    Flat,
    /// Long the spread (entered on deeply negative z).
    LongSpread,
    /// Short the spread (entered on deeply positive z).
    ShortSpread,
}

impl Position {
    /// PnL sign of the held position.
    pub fn sign(&self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::LongSpread => 1.0,
            Position::ShortSpread => -1.0,
        }
    }
}

/// One simulated bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacktestStep {
    pub timestamp: DateTime<Utc>,
    /// Position held after this bar's transition.
    pub position: Position,
    pub step_pnl: f64,
}

/// Full simulation output.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub steps: Vec<BacktestStep>,
    /// Running cumulative sum of `step_pnl`, one entry per step.
    pub equity_curve: Vec<f64>,
    pub total_pnl: f64,
    /// Number of position state changes.
    pub num_transitions: usize,
}

fn transition(position: Position, z: f64, cfg: &BacktestConfig) -> Position {
    match position {
        Position::Flat => {
            if z > cfg.entry_threshold {
                Position::ShortSpread
            } else if z < -cfg.entry_threshold {
                Position::LongSpread
            } else {
                Position::Flat
            }
        }
        held => {
            if z.abs() < cfg.exit_threshold {
                Position::Flat
            } else {
                held
            }
        }
    }
}

/// Simulate the mean-reversion rule over `(timestamp, z)` pairs.
///
/// Identical inputs always produce identical outputs.
pub fn run(z_series: &[(DateTime<Utc>, Option<f64>)], cfg: &BacktestConfig) -> BacktestResult {
    let mut steps = Vec::with_capacity(z_series.len());
    let mut equity_curve = Vec::with_capacity(z_series.len());
    let mut position = Position::Flat;
    let mut last_z: Option<f64> = None;
    let mut total_pnl = 0.0;
    let mut num_transitions = 0;

    for &(timestamp, z_opt) in z_series {
        let Some(z) = z_opt else {
            // No signal: hold state, accrue nothing
            steps.push(BacktestStep {
                timestamp,
                position,
                step_pnl: 0.0,
            });
            equity_curve.push(total_pnl);
            continue;
        };

        // PnL first: a position held entering the bar rides the z move
        let step_pnl = match last_z {
            Some(prev) if position != Position::Flat => (z - prev) * position.sign(),
            _ => 0.0,
        };
        total_pnl += step_pnl;

        let next = transition(position, z, cfg);
        if next != position {
            num_transitions += 1;
        }
        position = next;

        steps.push(BacktestStep {
            timestamp,
            position,
            step_pnl,
        });
        equity_curve.push(total_pnl);
        last_z = Some(z);
    }

    debug!(
        bars = steps.len(),
        total_pnl, num_transitions, "backtest complete"
    );
    BacktestResult {
        steps,
        equity_curve,
        total_pnl,
        num_transitions,
    }
}

/// Run the simulation directly over a computed spread/z-score series.
pub fn run_on_spread(points: &[SpreadZScorePoint], cfg: &BacktestConfig) -> BacktestResult {
    let z_series: Vec<(DateTime<Utc>, Option<f64>)> =
        points.iter().map(|p| (p.timestamp, p.z)).collect();
    run(&z_series, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn series(zs: &[Option<f64>]) -> Vec<(DateTime<Utc>, Option<f64>)> {
        zs.iter()
            .enumerate()
            .map(|(i, &z)| (Utc.timestamp_opt(i as i64 * 60, 0).unwrap(), z))
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let zs: Vec<Option<f64>> = [0.0, 1.0, 2.5, 1.5, 0.05, -2.6, -0.2]
            .iter()
            .map(|&z| Some(z))
            .collect();
        let cfg = BacktestConfig {
            entry_threshold: 2.0,
            exit_threshold: 0.1,
        };
        let result = run(&series(&zs), &cfg);

        use Position::*;
        let positions: Vec<Position> = result.steps.iter().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![Flat, Flat, ShortSpread, ShortSpread, Flat, LongSpread, LongSpread]
        );

        let pnls: Vec<f64> = result.steps.iter().map(|s| s.step_pnl).collect();
        let expected = [0.0, 0.0, 0.0, 1.0, 1.45, 0.0, 2.4];
        for (got, want) in pnls.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        assert_relative_eq!(result.total_pnl, 4.85, epsilon = 1e-12);
        assert_eq!(result.num_transitions, 3);
    }

    #[test]
    fn test_determinism() {
        let zs: Vec<Option<f64>> = (0..200)
            .map(|i| Some(((i * 13) % 7) as f64 - 3.0))
            .collect();
        let cfg = BacktestConfig::default();
        let s = series(&zs);

        let a = run(&s, &cfg);
        let b = run(&s, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn test_undefined_z_bars_are_skipped() {
        let zs = vec![
            Some(0.0),
            Some(2.5), // open short
            None,      // no pnl, no transition
            Some(1.5), // pnl measured against 2.5, not the gap
            Some(0.0), // exit
        ];
        let cfg = BacktestConfig {
            entry_threshold: 2.0,
            exit_threshold: 0.1,
        };
        let result = run(&series(&zs), &cfg);

        assert_eq!(result.steps[2].position, Position::ShortSpread);
        assert_eq!(result.steps[2].step_pnl, 0.0);
        assert_relative_eq!(result.steps[3].step_pnl, 1.0, epsilon = 1e-12);
        assert_eq!(result.steps[4].position, Position::Flat);
    }

    #[test]
    fn test_opening_bar_accrues_no_pnl() {
        let zs = vec![Some(0.0), Some(3.0), Some(2.0)];
        let result = run(&series(&zs), &BacktestConfig::default());
        assert_eq!(result.steps[1].position, Position::ShortSpread);
        assert_eq!(result.steps[1].step_pnl, 0.0);
        assert_relative_eq!(result.steps[2].step_pnl, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_equity_curve_is_cumulative() {
        let zs: Vec<Option<f64>> = [0.0, 2.5, 1.5, 0.5, 0.05].iter().map(|&z| Some(z)).collect();
        let result = run(&series(&zs), &BacktestConfig::default());

        let mut acc = 0.0;
        for (step, eq) in result.steps.iter().zip(&result.equity_curve) {
            acc += step.step_pnl;
            assert_relative_eq!(acc, *eq, epsilon = 1e-12);
        }
        assert_relative_eq!(
            result.total_pnl,
            *result.equity_curve.last().unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_empty_and_all_undefined_series() {
        let result = run(&[], &BacktestConfig::default());
        assert_eq!(result.total_pnl, 0.0);
        assert!(result.steps.is_empty());

        let result = run(&series(&[None, None, None]), &BacktestConfig::default());
        assert_eq!(result.total_pnl, 0.0);
        assert_eq!(result.num_transitions, 0);
        assert!(result.steps.iter().all(|s| s.position == Position::Flat));
    }

    #[test]
    fn test_position_holds_until_exit_band() {
        let zs: Vec<Option<f64>> = [0.0, -2.5, -1.0, -0.5, -0.2, -0.05]
            .iter()
            .map(|&z| Some(z))
            .collect();
        let cfg = BacktestConfig {
            entry_threshold: 2.0,
            exit_threshold: 0.1,
        };
        let result = run(&series(&zs), &cfg);

        use Position::*;
        let positions: Vec<Position> = result.steps.iter().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![Flat, LongSpread, LongSpread, LongSpread, LongSpread, Flat]
        );
        // Long ride from -2.5 up to -0.05
        assert_relative_eq!(result.total_pnl, 2.45, epsilon = 1e-12);
    }
}
