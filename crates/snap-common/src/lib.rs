//! Shared types for the forecast-snapshot workspace.

pub mod cycle;
pub mod error;

pub use cycle::{lookback_cycles, ForecastCycle};
pub use error::{SnapError, SnapResult};
