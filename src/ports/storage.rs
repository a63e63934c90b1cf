//! Tick/bar storage port.
//!
//! The storage collaborator persists raw ticks and serves read-only
//! snapshots; the analytics core treats everything it fetches as immutable.
//! Bars are resampled on read so the store holds a single source of truth.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{BarSeries, ResampleInterval, Tick};
use crate::ingestion::resample_ticks;

/// Storage error type.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Read/write port to the tick store.
///
/// `fetch_*` results are snapshots: the caller owns them and the store is
/// free to keep ingesting concurrently.
#[async_trait]
pub trait TickStorePort: Send + Sync {
    async fn insert_tick(&self, tick: Tick) -> Result<(), StorageError>;

    /// Ticks for `symbol` with `start <= timestamp < end`, arrival order.
    async fn fetch_ticks(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Tick>, StorageError>;

    /// Resampled bars over the same half-open range.
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: ResampleInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BarSeries, StorageError>;
}

/// In-memory tick store keyed by symbol.
///
/// Backs the demo binary and the integration tests in place of the
/// embedded analytical database.
#[derive(Debug, Default)]
pub struct InMemoryTickStore {
    ticks: RwLock<HashMap<String, Vec<Tick>>>,
}

impl InMemoryTickStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous insert for callback contexts (tick-stream delivery).
    pub fn insert(&self, tick: Tick) {
        let mut guard = match self.ticks.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .entry(tick.symbol.to_uppercase())
            .or_default()
            .push(tick);
    }

    pub fn tick_count(&self, symbol: &str) -> usize {
        self.ticks
            .read()
            .map(|g| g.get(&symbol.to_uppercase()).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn snapshot(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Tick> {
        let guard = match self.ticks.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .get(&symbol.to_uppercase())
            .map(|ticks| {
                ticks
                    .iter()
                    .filter(|t| t.timestamp >= start && t.timestamp < end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl TickStorePort for InMemoryTickStore {
    async fn insert_tick(&self, tick: Tick) -> Result<(), StorageError> {
        self.insert(tick);
        Ok(())
    }

    async fn fetch_ticks(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Tick>, StorageError> {
        Ok(self.snapshot(symbol, start, end))
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: ResampleInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BarSeries, StorageError> {
        let ticks = self.snapshot(symbol, start, end);
        Ok(resample_ticks(&ticks, interval))
    }
}
