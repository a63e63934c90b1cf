//! Trait abstractions for the external collaborators.
//!
//! The analytics core never talks to the network or a database directly:
//! live tick ingestion and tick/bar persistence sit behind these ports.
//! In-memory implementations back the demo binary and the test suite.

pub mod market_data;
pub mod storage;

pub use market_data::{MarketDataError, ReplayTickStream, TickCallback, TickStreamPort};
pub use storage::{InMemoryTickStore, StorageError, TickStorePort};
