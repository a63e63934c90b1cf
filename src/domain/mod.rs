//! Core domain types for pair analytics.
//!
//! Everything in this module is a plain immutable value: ticks and bars as
//! delivered by the ingestion/storage collaborators, the aligned pair view
//! used by all pairwise computations, and the shared error taxonomy.

pub mod align;
pub mod bar;
pub mod error;

pub use align::AlignedPair;
pub use bar::{BarSeries, OhlcBar, ResampleInterval, Tick};
pub use error::AnalyticsError;
