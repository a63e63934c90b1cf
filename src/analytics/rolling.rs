//! Rolling-window statistics.
//!
//! Both a batch form (whole series in, whole series out) and an incremental
//! form (accumulator + new point) are provided; the incremental accumulators
//! recompute over the retained window contents rather than maintaining
//! running sums, so the two forms produce bit-identical results.
//!
//! Standard deviation is the **sample** deviation (ddof = 1) throughout the
//! crate; the stationarity tester assumes the same convention.

use std::collections::VecDeque;

/// Mean and sample standard deviation over one full window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std: f64,
}

fn mean_of(values: impl Iterator<Item = f64> + Clone, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

fn stats_of_window(values: &[f64]) -> WindowStats {
    let n = values.len();
    let mean = mean_of(values.iter().copied(), n);
    let std = if n < 2 {
        0.0
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (n - 1) as f64).sqrt()
    };
    WindowStats { mean, std }
}

/// Incremental rolling mean/std accumulator over a trailing window.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    window: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    /// `window` must be at least 2.
    pub fn new(window: usize) -> Self {
        debug_assert!(window >= 2, "rolling window must be >= 2");
        Self {
            window,
            values: VecDeque::with_capacity(window + 1),
        }
    }

    /// Push a value; returns stats once the window is full, `None` before.
    pub fn push(&mut self, value: f64) -> Option<WindowStats> {
        self.values.push_back(value);
        if self.values.len() > self.window {
            self.values.pop_front();
        }
        if self.values.len() < self.window {
            return None;
        }
        let (front, back) = self.values.as_slices();
        if back.is_empty() {
            Some(stats_of_window(front))
        } else {
            let contiguous: Vec<f64> = self.values.iter().copied().collect();
            Some(stats_of_window(&contiguous))
        }
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.window
    }
}

/// Batch rolling mean/std: `None` for the first `window - 1` positions.
pub fn rolling_mean_std(values: &[f64], window: usize) -> Vec<Option<WindowStats>> {
    let mut acc = RollingWindow::new(window);
    values.iter().map(|&v| acc.push(v)).collect()
}

/// Pearson correlation of two equal-length slices.
///
/// `None` when fewer than 2 points or either side has zero variance.
pub fn pearson(y: &[f64], x: &[f64]) -> Option<f64> {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len();
    if n < 2 {
        return None;
    }
    let my = mean_of(y.iter().copied(), n);
    let mx = mean_of(x.iter().copied(), n);

    let mut cov = 0.0;
    let mut vy = 0.0;
    let mut vx = 0.0;
    for i in 0..n {
        let dy = y[i] - my;
        let dx = x[i] - mx;
        cov += dy * dx;
        vy += dy * dy;
        vx += dx * dx;
    }
    if vy == 0.0 || vx == 0.0 {
        return None;
    }
    Some(cov / (vy.sqrt() * vx.sqrt()))
}

/// Incremental rolling Pearson accumulator over a trailing window of pairs.
#[derive(Debug, Clone)]
pub struct RollingCorrWindow {
    window: usize,
    pairs: VecDeque<(f64, f64)>,
}

impl RollingCorrWindow {
    pub fn new(window: usize) -> Self {
        debug_assert!(window >= 2, "rolling window must be >= 2");
        Self {
            window,
            pairs: VecDeque::with_capacity(window + 1),
        }
    }

    /// Push a `(y, x)` pair. Outer `None` until the window fills; inner
    /// `None` when either side of the full window has zero variance.
    pub fn push(&mut self, y: f64, x: f64) -> Option<Option<f64>> {
        self.pairs.push_back((y, x));
        if self.pairs.len() > self.window {
            self.pairs.pop_front();
        }
        if self.pairs.len() < self.window {
            return None;
        }
        let ys: Vec<f64> = self.pairs.iter().map(|p| p.0).collect();
        let xs: Vec<f64> = self.pairs.iter().map(|p| p.1).collect();
        Some(pearson(&ys, &xs))
    }
}

/// Batch rolling Pearson correlation over trailing `window` pairs.
pub fn rolling_corr(y: &[f64], x: &[f64], window: usize) -> Vec<Option<f64>> {
    debug_assert_eq!(y.len(), x.len());
    let mut acc = RollingCorrWindow::new(window);
    y.iter()
        .zip(x.iter())
        .map(|(&yi, &xi)| acc.push(yi, xi).flatten())
        .collect()
}
