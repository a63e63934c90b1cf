//! Tick-to-bar ingestion: resampling and liquidity filtering.

pub mod resampler;

pub use resampler::{liquidity_filter, resample_ticks};
