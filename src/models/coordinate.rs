//! Coordinate model for geographic positions and distances

use chrono::{DateTime, TimeDelta, Utc};
use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

/// A position in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres (haversine, R = 6371 km)
    #[must_use]
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        distance(
            HaversineLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            HaversineLocation {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            Units::Kilometers,
        )
    }

    /// Format as a `lat,lng` pair suitable for query strings
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// A position reading together with the time the platform recorded it
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    pub recorded_at: DateTime<Utc>,
}

impl Fix {
    #[must_use]
    pub fn new(coordinate: Coordinate, recorded_at: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            recorded_at,
        }
    }

    /// Age of the reading relative to `now`. Readings stamped in the future count as fresh.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.recorded_at).max(TimeDelta::zero())
    }
}
