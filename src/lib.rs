//! Journey statistics engine
//!
//! Reconstructs ordered station paths from stored journeys and reduces
//! them into distance, stop/journey count and duration reports.

pub mod domain;
pub mod error;
pub mod infra;
pub mod io;
pub mod services;

pub use error::StatsError;
