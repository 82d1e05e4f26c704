//! `branch-finder` - Nearest branch resolution for the branch appointment client
//!
//! This library resolves a best-effort user position, searches for nearby branches of
//! the bank through a place search service and ranks them by distance. It also keeps
//! the small pieces of client-side state the booking flow needs.

pub mod branch_search;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod places;
pub mod preferences;

// Re-export core types for public API
pub use branch_search::{BranchSearchRanker, SearchSettings};
pub use config::BranchFinderConfig;
pub use error::BranchFinderError;
pub use location_resolver::{
    Accuracy, Clock, FixedPositionSource, LocationOrigin, LocationResolver, PositionSource,
    ResolvedLocation, ResolverSettings, UnavailablePositionSource,
};
pub use models::{BranchCandidate, Coordinate, Fix, RankedBranchList, ServiceRegion, is_in_region};
pub use notifications::{Notification, NotificationFeed};
pub use places::{GooglePlacesClient, PlaceField, PlaceSearch, RawPlace};
pub use preferences::Preferences;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, BranchFinderError>;
