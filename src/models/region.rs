//! Serviced region bounds

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Axis-aligned bounding box of the serviced country, closed on both ends
///
/// Missing bounds in a partial config table take the Sri Lanka values
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ServiceRegion {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl ServiceRegion {
    /// Bounding box of Sri Lanka
    pub const SRI_LANKA: ServiceRegion = ServiceRegion {
        min_latitude: 5.7,
        max_latitude: 9.9,
        min_longitude: 79.4,
        max_longitude: 82.1,
    };

    /// True iff the point lies inside both ranges. NaN is never inside.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }

    #[must_use]
    pub fn contains_coordinate(&self, coordinate: &Coordinate) -> bool {
        self.contains(coordinate.latitude, coordinate.longitude)
    }
}

impl Default for ServiceRegion {
    fn default() -> Self {
        Self::SRI_LANKA
    }
}

/// Whether a point lies inside the default serviced region
#[must_use]
pub fn is_in_region(latitude: f64, longitude: f64) -> bool {
    ServiceRegion::SRI_LANKA.contains(latitude, longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5.7, 80.0)]
    #[case(9.9, 80.0)]
    #[case(7.0, 79.4)]
    #[case(7.0, 82.1)]
    #[case(6.9271, 79.8612)]
    #[case(7.8731, 80.7718)]
    fn test_inside_region(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(is_in_region(latitude, longitude));
    }

    #[rstest]
    #[case(5.699_99, 80.0)]
    #[case(9.900_01, 80.0)]
    #[case(7.0, 79.399_99)]
    #[case(7.0, 82.100_01)]
    #[case(51.5074, -0.1278)]
    #[case(f64::NAN, 80.0)]
    #[case(7.0, f64::INFINITY)]
    fn test_outside_region(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(!is_in_region(latitude, longitude));
    }

    #[test]
    fn test_custom_region() {
        let region = ServiceRegion {
            min_latitude: 0.0,
            max_latitude: 1.0,
            min_longitude: 0.0,
            max_longitude: 1.0,
        };
        assert!(region.contains_coordinate(&Coordinate::new(0.5, 0.5)));
        assert!(!region.contains_coordinate(&Coordinate::new(6.9, 79.8)));
    }
}
