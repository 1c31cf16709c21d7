//! Computed statistics reports (never persisted)

use crate::domain::journey::{Journey, Section};
use crate::domain::period::Period;
use serde::Serialize;

/// Path data for one journey, for client-side rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyPath {
    pub sections: Vec<Section>,
}

impl From<&Journey> for JourneyPath {
    fn from(journey: &Journey) -> Self {
        Self { sections: journey.sections.clone() }
    }
}

impl From<Journey> for JourneyPath {
    fn from(journey: Journey) -> Self {
        Self { sections: journey.sections }
    }
}

/// Statistics for a single journey
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyReport {
    /// Path length, one fractional digit
    pub distance: f64,
    /// Stops traveled between passes (passes - 1, never negative)
    pub stops: u64,
    /// Stored journey duration in minutes
    pub duration: i64,
    pub coordinates: Vec<JourneyPath>,
}

/// Statistics across all of a user's journeys within a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub period: Period,
    /// Summed path length, rounded once to one fractional digit
    pub distance: f64,
    /// Number of journeys in the window
    pub journeys: u64,
    /// Summed duration in hours, one fractional digit
    pub duration: f64,
    pub coordinates: Vec<JourneyPath>,
}

impl SummaryReport {
    pub fn empty(period: Period) -> Self {
        Self { period, distance: 0.0, journeys: 0, duration: 0.0, coordinates: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::Pass;

    #[test]
    fn test_empty_summary_serializes_zeroes() {
        let json = serde_json::to_value(SummaryReport::empty(Period::All)).unwrap();
        assert_eq!(json["period"], "all");
        assert_eq!(json["distance"], 0.0);
        assert_eq!(json["journeys"], 0);
        assert_eq!(json["duration"], 0.0);
        assert_eq!(json["coordinates"], serde_json::json!([]));
    }

    #[test]
    fn test_journey_path_keeps_section_shape() {
        let journey = Journey::new("alice", 10).with_section(Section::new(vec![Pass::new("A", 1.0, 2.0)]));
        let json = serde_json::to_value(JourneyPath::from(&journey)).unwrap();
        assert_eq!(json["sections"][0]["passes"][0]["stationName"], "A");
    }
}
