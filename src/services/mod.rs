//! Services - business logic
//!
//! This module contains the core statistics services:
//! - `distance` - Path length over a journey's ordered passes
//! - `stats` - Report aggregation (single journey, all, per period)

pub mod distance;
pub mod stats;

// Re-export commonly used types
pub use distance::{path_length, round_to_one_decimal, DistanceMetric};
pub use stats::StatsService;
