//! Data models for branch resolution
//!
//! This module contains the core domain models organized by concern:
//! - Coordinate: Geographic position and distance
//! - Region: The serviced bounding box
//! - Branch: Branch candidates and ranked result lists

pub mod branch;
pub mod coordinate;
pub mod region;

// Re-export all public types for convenient access
pub use branch::{BranchCandidate, RankedBranchList};
pub use coordinate::{Coordinate, Fix};
pub use region::{ServiceRegion, is_in_region};
