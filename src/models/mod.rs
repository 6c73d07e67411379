//! Core data models for tournament snapshots and aggregated statistics.

mod ids;
mod stats;
mod week;

pub use ids::*;
pub use stats::*;
pub use week::*;
