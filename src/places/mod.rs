//! Place search collaborators
//!
//! The ranker only depends on [`PlaceSearch`]; [`GooglePlacesClient`] is the
//! HTTP implementation used by the binary.

pub mod google;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::models::Coordinate;

pub use google::GooglePlacesClient;

/// Result fields that can be requested from a text search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceField {
    Id,
    DisplayName,
    Name,
    Location,
    MapsUri,
    FormattedAddress,
}

impl PlaceField {
    /// Every field the branch ranker reads
    pub const BRANCH_FIELDS: [PlaceField; 6] = [
        PlaceField::Id,
        PlaceField::DisplayName,
        PlaceField::Name,
        PlaceField::Location,
        PlaceField::MapsUri,
        PlaceField::FormattedAddress,
    ];

    /// Field name as used in the places API field mask
    #[must_use]
    pub fn api_name(self) -> &'static str {
        match self {
            PlaceField::Id => "id",
            PlaceField::DisplayName => "displayName",
            PlaceField::Name => "name",
            PlaceField::Location => "location",
            PlaceField::MapsUri => "googleMapsUri",
            PlaceField::FormattedAddress => "formattedAddress",
        }
    }
}

/// One raw search result; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlace {
    pub id: Option<String>,
    pub display_name: Option<String>,
    /// Secondary human-readable name, used when `display_name` is absent
    pub name: Option<String>,
    pub location: Option<Coordinate>,
    pub maps_uri: Option<String>,
    pub formatted_address: Option<String>,
}

impl RawPlace {
    /// Display name, or the fallback name field when no display name was returned.
    /// Blank names count as missing.
    #[must_use]
    pub fn usable_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Text-query place search service
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_by_text(
        &self,
        query: &str,
        fields: &[PlaceField],
        max_results: u32,
    ) -> Result<Vec<RawPlace>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_name_prefers_display_name() {
        let place = RawPlace {
            display_name: Some("People's Bank - Kandy".to_string()),
            name: Some("places/abc".to_string()),
            ..RawPlace::default()
        };
        assert_eq!(place.usable_name(), Some("People's Bank - Kandy"));
    }

    #[test]
    fn test_usable_name_falls_back_to_name() {
        let place = RawPlace {
            name: Some("People's Bank".to_string()),
            ..RawPlace::default()
        };
        assert_eq!(place.usable_name(), Some("People's Bank"));
    }

    #[test]
    fn test_blank_name_is_unusable() {
        let place = RawPlace {
            display_name: Some("   ".to_string()),
            ..RawPlace::default()
        };
        assert_eq!(place.usable_name(), None);
        assert_eq!(RawPlace::default().usable_name(), None);
    }
}
