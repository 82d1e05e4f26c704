//! Nearest branch search
//!
//! Queries the place search collaborator by text, keeps results that are inside the
//! service region and carry the institution's brand tokens in their name, and ranks
//! them by distance from the caller's position.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{BranchCandidate, Coordinate, RankedBranchList, ServiceRegion};
use crate::places::{PlaceField, PlaceSearch, RawPlace};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub region: ServiceRegion,
    /// Institution name used in the text query
    pub institution: String,
    /// Lower-case tokens that must all appear in a branch name
    pub keywords: Vec<String>,
    pub max_candidates: u32,
    pub result_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            region: ServiceRegion::SRI_LANKA,
            institution: "People's Bank".to_string(),
            keywords: vec!["people".to_string(), "bank".to_string()],
            max_candidates: 30,
            result_limit: 10,
        }
    }
}

/// Finds the closest branches of one institution
pub struct BranchSearchRanker {
    places: Arc<dyn PlaceSearch>,
    settings: SearchSettings,
}

impl BranchSearchRanker {
    pub fn new(places: Arc<dyn PlaceSearch>) -> Self {
        Self::with_settings(places, SearchSettings::default())
    }

    pub fn with_settings(places: Arc<dyn PlaceSearch>, settings: SearchSettings) -> Self {
        Self { places, settings }
    }

    /// Text query with the center as a location hint; the search API has no radius bias
    #[must_use]
    pub fn build_query(&self, center: &Coordinate) -> String {
        format!(
            "{} near {}",
            self.settings.institution,
            center.format_coordinates()
        )
    }

    /// Closest branches to `center`. Collaborator failures yield an empty list.
    #[tracing::instrument(name = "search_nearby", level = "debug", skip(self))]
    pub async fn search_nearby(&self, center: Coordinate) -> RankedBranchList {
        let query = self.build_query(&center);

        let places = match self
            .places
            .search_by_text(&query, &PlaceField::BRANCH_FIELDS, self.settings.max_candidates)
            .await
        {
            Ok(places) => places,
            Err(e) => {
                warn!(error = %e, "Branch search failed, returning no branches");
                return RankedBranchList::empty();
            }
        };

        let total = places.len();
        let candidates: Vec<BranchCandidate> = places
            .into_iter()
            .filter_map(|place| self.to_candidate(place))
            .collect();
        if candidates.is_empty() && total > 0 {
            info!("None of the {} places returned is a usable branch", total);
        } else {
            debug!("{} of {} places passed the branch filters", candidates.len(), total);
        }

        let ranked = RankedBranchList::rank(center, candidates, self.settings.result_limit);
        info!("Ranked {} branches near {}", ranked.len(), center.format_coordinates());
        ranked
    }

    /// Keep a place only if it is named, located, inside the region and on-brand
    fn to_candidate(&self, place: RawPlace) -> Option<BranchCandidate> {
        let name = place.usable_name()?.to_string();
        let location = place.location?;

        if !self.settings.region.contains_coordinate(&location) {
            debug!("Dropping '{}': outside the service region", name);
            return None;
        }
        if !self.matches_keywords(&name) {
            debug!("Dropping '{}': missing brand keywords", name);
            return None;
        }

        Some(BranchCandidate {
            name,
            location,
            maps_uri: place.maps_uri,
            place_id: place.id,
            address: place.formatted_address,
            distance_km: None,
        })
    }

    fn matches_keywords(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.settings
            .keywords
            .iter()
            .all(|keyword| name.contains(&keyword.to_lowercase()))
    }
}
