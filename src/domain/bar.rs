//! Ticks, OHLC bars and bar series.
//!
//! Ticks arrive ordered per symbol and are never reordered. Bars are
//! produced by the resampler over fixed interval-aligned buckets; a bar
//! series may contain gaps (empty or filtered buckets emit nothing).

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single trade tick as delivered by the ingestion collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
    pub qty: f64,
}

impl Tick {
    pub fn new(timestamp: DateTime<Utc>, symbol: impl Into<String>, price: f64, qty: f64) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            price,
            qty,
        }
    }
}

/// Fixed resampling interval for tick-to-bar aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResampleInterval {
    #[serde(rename = "1s")]
    OneSecond,
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
}

impl ResampleInterval {
    /// Bucket width in milliseconds.
    pub fn millis(&self) -> i64 {
        match self {
            ResampleInterval::OneSecond => 1_000,
            ResampleInterval::OneMinute => 60_000,
            ResampleInterval::FiveMinutes => 300_000,
        }
    }

    /// Start of the interval-aligned bucket containing `ts`.
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let width = self.millis();
        let millis = ts.timestamp_millis();
        // Euclidean floor so pre-epoch timestamps still align downward
        let aligned = millis.div_euclid(width) * width;
        Utc.timestamp_millis_opt(aligned).single().unwrap_or(ts)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResampleInterval::OneSecond => "1s",
            ResampleInterval::OneMinute => "1m",
            ResampleInterval::FiveMinutes => "5m",
        }
    }
}

impl std::fmt::Display for ResampleInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One OHLCV bar. `timestamp` is the bucket start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcBar {
    /// Check the OHLC invariant: `low <= open, close <= high`, `volume >= 0`.
    pub fn is_valid(&self) -> bool {
        self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
            && self.volume >= 0.0
    }
}

/// Ordered-by-timestamp sequence of bars for one symbol. Gaps permitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<OhlcBar>,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from bars already in timestamp order.
    pub fn from_bars(bars: Vec<OhlcBar>) -> Self {
        debug_assert!(
            bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp),
            "bar series must be strictly increasing in time"
        );
        Self { bars }
    }

    pub fn push(&mut self, bar: OhlcBar) {
        debug_assert!(
            self.bars.last().map_or(true, |b| b.timestamp < bar.timestamp),
            "bars must be appended in time order"
        );
        self.bars.push(bar);
    }

    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&OhlcBar> {
        self.bars.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OhlcBar> {
        self.bars.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_bucket_alignment() {
        let interval = ResampleInterval::OneMinute;
        assert_eq!(interval.bucket_start(ts(65)), ts(60));
        assert_eq!(interval.bucket_start(ts(60)), ts(60));
        assert_eq!(interval.bucket_start(ts(119)), ts(60));
        assert_eq!(interval.bucket_start(ts(120)), ts(120));
    }

    #[test]
    fn test_interval_widths() {
        assert_eq!(ResampleInterval::OneSecond.millis(), 1_000);
        assert_eq!(ResampleInterval::OneMinute.millis(), 60_000);
        assert_eq!(ResampleInterval::FiveMinutes.millis(), 300_000);
    }

    #[test]
    fn test_ohlc_invariant() {
        let good = OhlcBar {
            timestamp: ts(0),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 3.0,
        };
        assert!(good.is_valid());

        let bad = OhlcBar { high: 9.5, ..good };
        assert!(!bad.is_valid());

        let negative_volume = OhlcBar { volume: -1.0, ..good };
        assert!(!negative_volume.is_valid());
    }

    #[test]
    fn test_series_push_and_access() {
        let mut series = BarSeries::new();
        assert!(series.is_empty());

        series.push(OhlcBar {
            timestamp: ts(0),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1.0,
        });
        series.push(OhlcBar {
            timestamp: ts(60),
            open: 2.0,
            high: 2.0,
            low: 2.0,
            close: 2.0,
            volume: 1.0,
        });

        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().close, 2.0);
    }
}
