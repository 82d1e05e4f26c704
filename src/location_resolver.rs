//! Location Resolution Module
//!
//! Produces a best-effort position for the user. The cached platform reading is used
//! when it is recent and inside the service region; otherwise a fresh reading is
//! requested with a time limit. Every failure ends at the fallback coordinate, so
//! callers always receive a usable point.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Result;
use crate::error::BranchFinderError;
use crate::models::{Coordinate, Fix, ServiceRegion};

/// Accuracy requested from the platform for a fresh reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    High,
    Balanced,
}

/// Platform location collaborator
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Last position the platform cached, if any
    async fn last_known_position(&self) -> Result<Option<Fix>>;

    /// Request a new reading. Dropping the future cancels the request.
    async fn current_position(&self, accuracy: Accuracy) -> Result<Coordinate>;
}

/// Where a resolved coordinate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationOrigin {
    Cached,
    Fresh,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub origin: LocationOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverSettings {
    pub region: ServiceRegion,
    pub fallback: Coordinate,
    pub max_cached_age: Duration,
    pub fresh_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            region: ServiceRegion::SRI_LANKA,
            fallback: LocationResolver::FALLBACK,
            max_cached_age: Duration::from_millis(300_000),
            fresh_timeout: Duration::from_millis(10_000),
        }
    }
}

/// Wall-clock source used to age cached readings
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Service for resolving the user's current position
pub struct LocationResolver {
    source: Arc<dyn PositionSource>,
    settings: ResolverSettings,
    clock: Clock,
}

impl LocationResolver {
    /// Geographic centre of Sri Lanka
    pub const FALLBACK: Coordinate = Coordinate::new(7.8731, 80.7718);

    pub fn new(source: Arc<dyn PositionSource>) -> Self {
        Self::with_settings(source, ResolverSettings::default())
    }

    pub fn with_settings(source: Arc<dyn PositionSource>, settings: ResolverSettings) -> Self {
        Self {
            source,
            settings,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, e.g. with a fixed time in tests
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve the current position, falling back to the region centre on any failure
    pub async fn resolve_location(&self) -> Coordinate {
        self.resolve().await.coordinate
    }

    /// Like [`Self::resolve_location`] but also reports which path produced the point
    #[tracing::instrument(name = "resolve_location", level = "debug", skip(self))]
    pub async fn resolve(&self) -> ResolvedLocation {
        if let Some(coordinate) = self.cached_position().await {
            debug!(
                "Using cached position ({}, {})",
                coordinate.latitude, coordinate.longitude
            );
            return ResolvedLocation {
                coordinate,
                origin: LocationOrigin::Cached,
            };
        }

        match self.fresh_position().await {
            Ok(coordinate) => {
                debug!(
                    "Using fresh position ({}, {})",
                    coordinate.latitude, coordinate.longitude
                );
                ResolvedLocation {
                    coordinate,
                    origin: LocationOrigin::Fresh,
                }
            }
            Err(e) => {
                warn!(error = %e, "Falling back to default location");
                ResolvedLocation {
                    coordinate: self.settings.fallback,
                    origin: LocationOrigin::Fallback,
                }
            }
        }
    }

    /// Cached platform position if it is recent and inside the region
    async fn cached_position(&self) -> Option<Coordinate> {
        let fix = match self.source.last_known_position().await {
            Ok(Some(fix)) => fix,
            Ok(None) => {
                debug!("No cached position available");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "Cached position unavailable");
                return None;
            }
        };

        // Aged against the time the reading came back, not when it was requested
        let now = (self.clock)();

        if !self.settings.region.contains_coordinate(&fix.coordinate) {
            debug!(
                "Cached position ({}, {}) is outside the service region",
                fix.coordinate.latitude, fix.coordinate.longitude
            );
            return None;
        }

        let age = fix.age(now).to_std().unwrap_or_default();
        if age >= self.settings.max_cached_age {
            debug!("Cached position is stale ({} ms old)", age.as_millis());
            return None;
        }

        Some(fix.coordinate)
    }

    /// Fresh high-accuracy reading, bounded by the configured timeout
    async fn fresh_position(&self) -> Result<Coordinate> {
        let timeout = self.settings.fresh_timeout;
        let coordinate = tokio::time::timeout(timeout, self.source.current_position(Accuracy::High))
            .await
            .map_err(|_| BranchFinderError::Timeout {
                after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        if !self.settings.region.contains_coordinate(&coordinate) {
            return Err(BranchFinderError::OutOfRegion {
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
            });
        }

        Ok(coordinate)
    }
}

/// A source that always reports the same position, recorded when it is queried
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionSource {
    coordinate: Coordinate,
}

impl FixedPositionSource {
    #[must_use]
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn last_known_position(&self) -> Result<Option<Fix>> {
        Ok(Some(Fix::new(self.coordinate, Utc::now())))
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinate> {
        Ok(self.coordinate)
    }
}

/// A source for hosts without location access
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailablePositionSource;

#[async_trait]
impl PositionSource for UnavailablePositionSource {
    async fn last_known_position(&self) -> Result<Option<Fix>> {
        Ok(None)
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinate> {
        Err(BranchFinderError::permission_denied(
            "location services are not available on this host",
        ))
    }
}
