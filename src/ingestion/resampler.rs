//! Resampler & Liquidity Filter
//!
//! Partitions an ordered tick stream into non-overlapping, interval-aligned
//! buckets and aggregates each non-empty bucket into one OHLCV bar
//! (`open = first, high = max, low = min, close = last, volume = sum`).
//! Empty buckets emit no bar, so the output series may contain gaps.
//!
//! The liquidity filter removes bars below a minimum volume entirely; a
//! removed bar leaves a gap rather than a zeroed placeholder.

use tracing::debug;

use crate::domain::{BarSeries, OhlcBar, ResampleInterval, Tick};

/// Aggregate ordered ticks for one symbol into fixed-interval OHLCV bars.
///
/// Ticks are consumed in arrival order and never reordered; each tick joins
/// the bucket `[bucket_start, bucket_start + interval)` containing its
/// timestamp. Empty input yields an empty series.
pub fn resample_ticks(ticks: &[Tick], interval: ResampleInterval) -> BarSeries {
    let mut series = BarSeries::new();
    let mut current: Option<OhlcBar> = None;

    for tick in ticks {
        let bucket = interval.bucket_start(tick.timestamp);

        match current.as_mut() {
            Some(bar) if bar.timestamp == bucket => {
                bar.high = bar.high.max(tick.price);
                bar.low = bar.low.min(tick.price);
                bar.close = tick.price;
                bar.volume += tick.qty;
            }
            _ => {
                if let Some(done) = current.take() {
                    series.push(done);
                }
                current = Some(OhlcBar {
                    timestamp: bucket,
                    open: tick.price,
                    high: tick.price,
                    low: tick.price,
                    close: tick.price,
                    volume: tick.qty,
                });
            }
        }
    }

    if let Some(done) = current {
        series.push(done);
    }

    debug!(
        interval = %interval,
        ticks = ticks.len(),
        bars = series.len(),
        "resampled ticks"
    );
    series
}

/// Drop bars with `volume < min_volume`. A threshold of zero disables the
/// filter. Dropped bars are removed entirely, creating gaps in the series.
pub fn liquidity_filter(series: &BarSeries, min_volume: f64) -> BarSeries {
    if min_volume <= 0.0 {
        return series.clone();
    }

    let kept: Vec<OhlcBar> = series
        .iter()
        .filter(|bar| bar.volume >= min_volume)
        .copied()
        .collect();

    if kept.len() < series.len() {
        debug!(
            dropped = series.len() - kept.len(),
            min_volume, "liquidity filter removed illiquid bars"
        );
    }
    BarSeries::from_bars(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn tick(secs: i64, price: f64, qty: f64) -> Tick {
        Tick::new(ts(secs), "BTCUSDT", price, qty)
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        let series = resample_ticks(&[], ResampleInterval::OneMinute);
        assert!(series.is_empty());
    }

    #[test]
    fn test_single_bucket_aggregation() {
        let ticks = vec![
            tick(0, 100.0, 1.0),
            tick(10, 105.0, 2.0),
            tick(20, 95.0, 1.0),
            tick(59, 101.0, 0.5),
        ];
        let series = resample_ticks(&ticks, ResampleInterval::OneMinute);
        assert_eq!(series.len(), 1);

        let bar = &series.bars()[0];
        assert_eq!(bar.timestamp, ts(0));
        assert_eq!(bar.open, 100.0);
        assert_eq!(bar.high, 105.0);
        assert_eq!(bar.low, 95.0);
        assert_eq!(bar.close, 101.0);
        assert_eq!(bar.volume, 4.5);
        assert!(bar.is_valid());
    }

    #[test]
    fn test_empty_buckets_create_gaps() {
        // Ticks in minutes 0 and 2, nothing in minute 1
        let ticks = vec![tick(5, 100.0, 1.0), tick(125, 102.0, 1.0)];
        let series = resample_ticks(&ticks, ResampleInterval::OneMinute);

        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].timestamp, ts(0));
        assert_eq!(series.bars()[1].timestamp, ts(120));
    }

    #[test]
    fn test_bucket_boundary_is_half_open() {
        // Second 60 belongs to the second bucket, not the first
        let ticks = vec![tick(59, 100.0, 1.0), tick(60, 200.0, 1.0)];
        let series = resample_ticks(&ticks, ResampleInterval::OneMinute);
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].close, 100.0);
        assert_eq!(series.bars()[1].open, 200.0);
    }

    #[test]
    fn test_resampler_associativity() {
        // Direct 5-minute bars must match five 1-minute bars recombined
        let mut ticks = Vec::new();
        for i in 0..600 {
            let price = 100.0 + ((i * 13) % 37) as f64 * 0.1;
            ticks.push(tick(i, price, 1.0 + (i % 3) as f64));
        }

        let direct = resample_ticks(&ticks, ResampleInterval::FiveMinutes);
        let fine = resample_ticks(&ticks, ResampleInterval::OneMinute);

        // Recombine consecutive 1m bars per 5m bucket
        let mut combined: Vec<OhlcBar> = Vec::new();
        for chunk in fine.bars().chunks(5) {
            let first = chunk.first().unwrap();
            let last = chunk.last().unwrap();
            combined.push(OhlcBar {
                timestamp: ResampleInterval::FiveMinutes.bucket_start(first.timestamp),
                open: first.open,
                high: chunk.iter().map(|b| b.high).fold(f64::MIN, f64::max),
                low: chunk.iter().map(|b| b.low).fold(f64::MAX, f64::min),
                close: last.close,
                volume: chunk.iter().map(|b| b.volume).sum(),
            });
        }

        assert_eq!(direct.bars(), combined.as_slice());
    }

    #[test]
    fn test_liquidity_filter_drops_bars_entirely() {
        let ticks = vec![
            tick(0, 100.0, 5.0),
            tick(60, 101.0, 0.5),
            tick(120, 102.0, 3.0),
        ];
        let series = resample_ticks(&ticks, ResampleInterval::OneMinute);
        let filtered = liquidity_filter(&series, 1.0);

        assert_eq!(filtered.len(), 2);
        // The illiquid minute-1 bar is absent, not zeroed
        assert!(filtered.iter().all(|b| b.timestamp != ts(60)));
        assert!(filtered.iter().all(|b| b.volume >= 1.0));
    }

    #[test]
    fn test_zero_threshold_disables_filter() {
        let ticks = vec![tick(0, 100.0, 0.1), tick(60, 101.0, 0.2)];
        let series = resample_ticks(&ticks, ResampleInterval::OneMinute);
        let filtered = liquidity_filter(&series, 0.0);
        assert_eq!(filtered, series);
    }
}
