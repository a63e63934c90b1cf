//! Pairscope - Statistical-Arbitrage Pair Analytics Library
//!
//! Turns two aligned price-bar series into a standardized mean-reversion
//! signal and evaluates it: robust and time-varying hedge ratios, spread
//! z-scores, ADF stationarity testing, rolling/lead-lag correlation,
//! threshold alerting and a deterministic backtest.
//!
//! # Modules
//!
//! - `domain`: Core value types (Tick, OhlcBar, BarSeries, AlignedPair)
//! - `ingestion`: Tick resampling and liquidity filtering
//! - `analytics`: The analytics engines (hedge, spread, ADF, correlation,
//!   alerts, backtest, export rows)
//! - `ports`: Trait abstractions for the ingestion/storage collaborators
//! - `application`: The `PairAnalyzer` pipeline orchestrator
//! - `config`: Configuration loading and validation

pub mod analytics;
pub mod application;
pub mod config;
pub mod domain;
pub mod ingestion;
pub mod ports;
