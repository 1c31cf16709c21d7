//! Path length over the ordered passes of one journey
//!
//! The path is the concatenation of every section's passes in section
//! order. The last pass of a section and the first pass of the next one
//! are adjacent; empty sections are skipped without breaking adjacency.

use crate::domain::journey::{travel_order, Coordinate, Section};
use serde::Deserialize;
use thiserror::Error;

/// Mean Earth radius used by the haversine metric (km)
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Distance metric applied to every adjacent pair of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance in coordinate units
    #[default]
    Planar,
    /// Great-circle distance in km, X = latitude and Y = longitude in degrees
    Haversine,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Planar => "planar",
            DistanceMetric::Haversine => "haversine",
        }
    }

    /// Distance between two points. Non-negative, zero for coincident points.
    #[inline]
    pub fn between(&self, a: Coordinate, b: Coordinate) -> f64 {
        match self {
            DistanceMetric::Planar => (b.x - a.x).hypot(b.y - a.y),
            DistanceMetric::Haversine => haversine_km(a, b),
        }
    }
}

fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.x.to_radians(), b.x.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.y - a.y).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // clamp guards asin against h drifting past 1.0
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DistanceError {
    /// Pass at flattened `index` has a NaN or infinite coordinate
    #[error("invalid coordinate at pass {index}: ({x}, {y})")]
    InvalidCoordinate { index: usize, x: f64, y: f64 },
}

/// Total length of the path through all passes of `sections`.
///
/// Zero or one pass yields 0.0.
///
/// # Example
///
/// ```
/// use journey_stats::domain::{Pass, Section};
/// use journey_stats::services::distance::{path_length, DistanceMetric};
///
/// let sections = vec![
///     Section::new(vec![Pass::new("A", 0.0, 0.0), Pass::new("B", 3.0, 4.0)]),
///     Section::new(vec![Pass::new("B", 3.0, 4.0), Pass::new("C", 3.0, 7.0)]),
/// ];
/// assert_eq!(path_length(&sections, DistanceMetric::Planar).unwrap(), 8.0);
/// ```
pub fn path_length(sections: &[Section], metric: DistanceMetric) -> Result<f64, DistanceError> {
    let mut coordinates = travel_order(sections).map(|p| p.coordinate()).enumerate();

    let Some((_, first)) = coordinates.next() else {
        return Ok(0.0);
    };
    check_finite(0, first)?;

    let mut total = 0.0;
    let mut previous = first;
    for (index, current) in coordinates {
        check_finite(index, current)?;
        total += metric.between(previous, current);
        previous = current;
    }
    Ok(total)
}

#[inline]
fn check_finite(index: usize, c: Coordinate) -> Result<(), DistanceError> {
    if c.is_finite() {
        Ok(())
    } else {
        Err(DistanceError::InvalidCoordinate { index, x: c.x, y: c.y })
    }
}

/// Round to one fractional digit, half away from zero on the binary value
#[inline]
pub fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::{Journey, Pass};
    use proptest::prelude::*;

    fn section(points: &[(f64, f64)]) -> Section {
        Section::new(points.iter().map(|&(x, y)| Pass::new("S", x, y)).collect())
    }

    #[test]
    fn test_empty_and_single_pass_are_zero() {
        assert_eq!(path_length(&[], DistanceMetric::Planar), Ok(0.0));
        assert_eq!(path_length(&[Section::default()], DistanceMetric::Planar), Ok(0.0));
        assert_eq!(path_length(&[section(&[(5.0, 5.0)])], DistanceMetric::Planar), Ok(0.0));
    }

    #[test]
    fn test_two_section_example() {
        let sections = vec![section(&[(0.0, 0.0), (3.0, 4.0)]), section(&[(3.0, 4.0), (3.0, 7.0)])];
        assert_eq!(path_length(&sections, DistanceMetric::Planar), Ok(8.0));
    }

    #[test]
    fn test_adjacency_crosses_empty_sections() {
        let sections = vec![section(&[(0.0, 0.0)]), Section::default(), Section::default(), section(&[(0.0, 2.0)])];
        assert_eq!(path_length(&sections, DistanceMetric::Planar), Ok(2.0));
    }

    #[test]
    fn test_order_sensitive() {
        let in_order = vec![section(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])];
        let shuffled = vec![section(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0)])];
        assert_eq!(path_length(&in_order, DistanceMetric::Planar), Ok(2.0));
        assert_eq!(path_length(&shuffled, DistanceMetric::Planar), Ok(3.0));
    }

    #[test]
    fn test_invalid_coordinate_reports_index() {
        let sections = vec![section(&[(0.0, 0.0)]), section(&[(1.0, 1.0), (f64::NAN, 2.0)])];
        match path_length(&sections, DistanceMetric::Planar) {
            Err(DistanceError::InvalidCoordinate { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected invalid coordinate, got {other:?}"),
        }

        let first_bad = vec![section(&[(f64::INFINITY, 0.0)])];
        assert!(path_length(&first_bad, DistanceMetric::Planar).is_err());
    }

    #[test]
    fn test_invalid_index_is_journey_pass_position() {
        let journey = Journey::new("alice", 0)
            .with_section(section(&[(0.0, 0.0), (1.0, 0.0)]))
            .with_section(Section::default())
            .with_section(section(&[(2.0, 0.0), (f64::NAN, 0.0)]));

        let position = journey.passes().position(|p| !p.coordinate().is_finite()).unwrap();
        match path_length(&journey.sections, DistanceMetric::Planar) {
            Err(DistanceError::InvalidCoordinate { index, .. }) => assert_eq!(index, position),
            other => panic!("expected invalid coordinate, got {other:?}"),
        }
        assert_eq!(position, 3);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Zurich HB -> Bern, roughly 95 km as the crow flies
        let zurich = Coordinate::new(47.3779, 8.5403);
        let bern = Coordinate::new(46.9490, 7.4391);
        let d = DistanceMetric::Haversine.between(zurich, bern);
        assert!((d - 95.5).abs() < 1.5, "got {d}");
        assert_eq!(DistanceMetric::Haversine.between(zurich, zurich), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = DistanceMetric::Haversine.between(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_metric_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            metric: DistanceMetric,
        }
        let w: Wrapper = toml::from_str("metric = \"haversine\"").unwrap();
        assert_eq!(w.metric, DistanceMetric::Haversine);
        assert_eq!(DistanceMetric::default(), DistanceMetric::Planar);
    }

    #[test]
    fn test_rounding_boundaries() {
        assert_eq!(round_to_one_decimal(12.34999), 12.3);
        // 12.345 is stored as 12.34499999..., below the midpoint
        assert_eq!(round_to_one_decimal(12.345), 12.3);
        // exact midpoints round away from zero
        assert_eq!(round_to_one_decimal(12.25), 12.3);
        assert_eq!(round_to_one_decimal(12.75), 12.8);
        assert_eq!(round_to_one_decimal(0.0), 0.0);
        assert_eq!(round_to_one_decimal(8.0), 8.0);
    }

    fn arb_points() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((-1.0e4..1.0e4f64, -1.0e4..1.0e4f64), 0..40)
    }

    proptest! {
        #[test]
        fn prop_distance_non_negative(points in arb_points()) {
            let d = path_length(&[section(&points)], DistanceMetric::Planar).unwrap();
            prop_assert!(d >= 0.0);
        }

        #[test]
        fn prop_distance_is_sum_of_consecutive_pairs(points in arb_points()) {
            let d = path_length(&[section(&points)], DistanceMetric::Planar).unwrap();
            let expected: f64 = points
                .windows(2)
                .map(|w| DistanceMetric::Planar.between(Coordinate::new(w[0].0, w[0].1), Coordinate::new(w[1].0, w[1].1)))
                .sum();
            prop_assert_eq!(d, expected);
        }

        #[test]
        fn prop_section_split_does_not_change_distance(points in arb_points(), split in 0usize..40) {
            let split = split.min(points.len());
            let whole = path_length(&[section(&points)], DistanceMetric::Planar).unwrap();
            let parts = path_length(
                &[section(&points[..split]), Section::default(), section(&points[split..])],
                DistanceMetric::Planar,
            )
            .unwrap();
            prop_assert_eq!(whole, parts);
        }
    }
}
