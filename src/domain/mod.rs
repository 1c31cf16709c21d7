//! Domain models - journeys, reporting windows and reports
//!
//! This module contains the canonical data types used throughout the system:
//! - `Journey` - a user's trip, ordered `Section`s of station `Pass`es
//! - `Period` - time-window selector for summary reports
//! - `JourneyReport` / `SummaryReport` - computed statistics
//! - `RequestContext` - identity of the caller

pub mod journey;
pub mod period;
pub mod report;
pub mod types;

// Re-export commonly used types at module level
pub use journey::{travel_order, Coordinate, Journey, Pass, Section};
pub use period::{ParsePeriodError, Period};
pub use report::{JourneyPath, JourneyReport, SummaryReport};
pub use types::{JourneyId, RequestContext, UserId};
