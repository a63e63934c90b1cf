//! Tick ingestion port.
//!
//! The ingestion collaborator delivers an ordered stream of ticks per
//! symbol through a registered callback. The engine never reorders what it
//! receives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::Tick;

/// Tick ingestion error type.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Stream connection error: {0}")]
    ConnectionError(String),

    #[error("Subscription error: {0}")]
    SubscriptionError(String),
}

/// Callback invoked for every delivered tick, in arrival order.
pub type TickCallback = Arc<dyn Fn(Tick) + Send + Sync>;

/// Live tick stream port.
#[async_trait]
pub trait TickStreamPort: Send + Sync {
    /// Subscribe to the given symbols; `on_tick` fires per tick in order.
    async fn subscribe(
        &self,
        symbols: &[String],
        on_tick: TickCallback,
    ) -> Result<(), MarketDataError>;

    /// Stop delivering ticks.
    async fn stop(&self) -> Result<(), MarketDataError>;

    fn is_connected(&self) -> bool;
}

/// Replays a pre-recorded tick sequence through the callback interface.
///
/// Stands in for the live websocket collaborator in the demo binary and in
/// tests; delivery order is exactly the recorded order.
pub struct ReplayTickStream {
    ticks: Vec<Tick>,
    connected: AtomicBool,
}

impl ReplayTickStream {
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self {
            ticks,
            connected: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl TickStreamPort for ReplayTickStream {
    async fn subscribe(
        &self,
        symbols: &[String],
        on_tick: TickCallback,
    ) -> Result<(), MarketDataError> {
        if symbols.is_empty() {
            return Err(MarketDataError::SubscriptionError(
                "no symbols requested".into(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);

        let mut delivered = 0usize;
        for tick in &self.ticks {
            if symbols.iter().any(|s| s.eq_ignore_ascii_case(&tick.symbol)) {
                on_tick(tick.clone());
                delivered += 1;
            }
        }
        debug!(delivered, "replay stream finished");

        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), MarketDataError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
