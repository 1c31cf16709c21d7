//! Journey data model: a user's trip as ordered sections of station passes

use crate::domain::types::{JourneyId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a new UUIDv7 (time-sortable)
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}

fn new_journey_id() -> JourneyId {
    JourneyId(new_uuid_v7())
}

/// Every pass of `sections` in travel order: section order, then pass
/// order. Empty sections contribute nothing.
pub fn travel_order(sections: &[Section]) -> impl Iterator<Item = &Pass> {
    sections.iter().flat_map(|s| s.passes.iter())
}

/// A point on the map. X/Y units are consistent across the whole system
/// (planar metres, or latitude/longitude degrees for the haversine metric).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A single station visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pass {
    pub station_name: String,
    pub station_coordinate_x: f64,
    pub station_coordinate_y: f64,
}

impl Pass {
    pub fn new(station_name: &str, x: f64, y: f64) -> Self {
        Self {
            station_name: station_name.to_string(),
            station_coordinate_x: x,
            station_coordinate_y: y,
        }
    }

    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.station_coordinate_x, self.station_coordinate_y)
    }
}

/// A contiguous leg of a journey, passes in travel order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub passes: Vec<Pass>,
}

impl Section {
    pub fn new(passes: Vec<Pass>) -> Self {
        Self { passes }
    }
}

/// Complete journey as read from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    #[serde(default = "new_journey_id")]
    pub id: JourneyId,
    pub user_id: UserId,
    /// Stored duration in minutes
    #[serde(default)]
    pub duration: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Journey {
    /// Create an empty journey owned by `user_id`.
    ///
    /// # Example
    ///
    /// ```
    /// use journey_stats::domain::journey::{Journey, Pass, Section};
    ///
    /// let journey = Journey::new("alice", 42)
    ///     .with_section(Section::new(vec![Pass::new("A", 0.0, 0.0), Pass::new("B", 3.0, 4.0)]));
    /// assert_eq!(journey.pass_count(), 2);
    /// assert_eq!(journey.stops(), 1);
    /// ```
    pub fn new(user_id: &str, duration_minutes: i64) -> Self {
        Self {
            id: new_journey_id(),
            user_id: UserId::from(user_id),
            duration: duration_minutes,
            created_at: Utc::now(),
            sections: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = JourneyId::from(id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn passes(&self) -> impl Iterator<Item = &Pass> {
        travel_order(&self.sections)
    }

    pub fn pass_count(&self) -> usize {
        self.sections.iter().map(|s| s.passes.len()).sum()
    }

    /// Number of stops traveled between passes
    pub fn stops(&self) -> u64 {
        self.pass_count().saturating_sub(1) as u64
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_section_journey() -> Journey {
        Journey::new("alice", 30)
            .with_section(Section::new(vec![Pass::new("A", 0.0, 0.0), Pass::new("B", 3.0, 4.0)]))
            .with_section(Section::default())
            .with_section(Section::new(vec![Pass::new("B", 3.0, 4.0), Pass::new("C", 3.0, 7.0)]))
    }

    #[test]
    fn test_passes_flatten_in_travel_order() {
        let journey = two_section_journey();
        let names: Vec<&str> = journey.passes().map(|p| p.station_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "B", "C"]);
        assert_eq!(journey.pass_count(), 4);
        assert_eq!(journey.stops(), 3);
    }

    #[test]
    fn test_stops_clamped_at_zero() {
        let empty = Journey::new("alice", 0);
        assert_eq!(empty.stops(), 0);

        let single = Journey::new("alice", 0).with_section(Section::new(vec![Pass::new("A", 1.0, 1.0)]));
        assert_eq!(single.stops(), 0);
    }

    #[test]
    fn test_new_journey_ids_are_unique() {
        let a = Journey::new("alice", 0);
        let b = Journey::new("alice", 0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_deserialize_import_line() {
        let line = r#"{"userId":"bob","duration":95,"createdAt":"2026-10-01T08:00:00Z",
            "sections":[{"passes":[{"stationName":"Zurich HB","stationCoordinateX":1.5,"stationCoordinateY":2.5}]}]}"#;
        let journey: Journey = serde_json::from_str(line).unwrap();

        assert_eq!(journey.user_id, UserId::from("bob"));
        assert_eq!(journey.duration, 95);
        assert!(!journey.id.as_str().is_empty());
        assert_eq!(journey.passes().next().unwrap().coordinate(), Coordinate::new(1.5, 2.5));
    }

    #[test]
    fn test_pass_serializes_camel_case() {
        let json = serde_json::to_value(Pass::new("Bern", 1.0, 2.0)).unwrap();
        assert_eq!(json["stationName"], "Bern");
        assert_eq!(json["stationCoordinateX"], 1.0);
        assert_eq!(json["stationCoordinateY"], 2.0);
    }

    #[test]
    fn test_ownership() {
        let journey = Journey::new("alice", 0);
        assert!(journey.is_owned_by(&UserId::from("alice")));
        assert!(!journey.is_owned_by(&UserId::from("mallory")));
    }
}
