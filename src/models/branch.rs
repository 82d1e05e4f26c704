//! Branch candidates and ranked result lists

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A plausible branch location returned by a place search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BranchCandidate {
    pub name: String,
    pub location: Coordinate,
    /// Deep link into an external map application
    pub maps_uri: Option<String>,
    pub place_id: Option<String>,
    pub address: Option<String>,
    /// Distance from the search center, set when the candidate is ranked
    pub distance_km: Option<f64>,
}

impl BranchCandidate {
    #[must_use]
    pub fn new(name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            name: name.into(),
            location,
            maps_uri: None,
            place_id: None,
            address: None,
            distance_km: None,
        }
    }

    /// The external deep link if present, otherwise a coordinate search link
    #[must_use]
    pub fn map_link(&self) -> String {
        match &self.maps_uri {
            Some(uri) if !uri.trim().is_empty() => uri.clone(),
            _ => format!(
                "https://www.google.com/maps/search/?api=1&query={}",
                self.location.format_coordinates()
            ),
        }
    }
}

/// Branches ordered by ascending distance from a reference point
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RankedBranchList {
    pub center: Option<Coordinate>,
    pub branches: Vec<BranchCandidate>,
}

impl RankedBranchList {
    /// Rank `candidates` by distance from `center`, keeping at most `limit`.
    /// Equal distances keep their input order.
    #[must_use]
    pub fn rank(center: Coordinate, candidates: Vec<BranchCandidate>, limit: usize) -> Self {
        let mut branches: Vec<BranchCandidate> = candidates
            .into_iter()
            .map(|mut candidate| {
                candidate.distance_km = Some(center.distance_km(&candidate.location));
                candidate
            })
            .collect();

        branches.sort_by(|a, b| {
            a.distance_km
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
        });
        branches.truncate(limit);

        Self {
            center: Some(center),
            branches,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    #[must_use]
    pub fn nearest(&self) -> Option<&BranchCandidate> {
        self.branches.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BranchCandidate> {
        self.branches.iter()
    }
}

impl IntoIterator for RankedBranchList {
    type Item = BranchCandidate;
    type IntoIter = std::vec::IntoIter<BranchCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.branches.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_link_prefers_deep_link() {
        let mut branch = BranchCandidate::new("People's Bank - Kandy", Coordinate::new(7.29, 80.63));
        branch.maps_uri = Some("https://maps.google.com/?cid=42".to_string());
        assert_eq!(branch.map_link(), "https://maps.google.com/?cid=42");
    }

    #[test]
    fn test_map_link_falls_back_to_coordinates() {
        let branch = BranchCandidate::new("People's Bank - Kandy", Coordinate::new(7.29, 80.63));
        assert_eq!(
            branch.map_link(),
            "https://www.google.com/maps/search/?api=1&query=7.29,80.63"
        );
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let center = Coordinate::new(6.9271, 79.8612);
        let candidates = vec![
            BranchCandidate::new("far", Coordinate::new(9.66, 80.02)),
            BranchCandidate::new("near", Coordinate::new(6.93, 79.86)),
            BranchCandidate::new("middle", Coordinate::new(7.29, 80.63)),
        ];

        let ranked = RankedBranchList::rank(center, candidates, 2);
        let names: Vec<&str> = ranked.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["near", "middle"]);
        assert!(ranked.branches.iter().all(|b| b.distance_km.is_some()));
        assert_eq!(ranked.nearest().map(|b| b.name.as_str()), Some("near"));
    }

    #[test]
    fn test_rank_keeps_input_order_on_ties() {
        let center = Coordinate::new(7.0, 80.0);
        let here = Coordinate::new(7.0, 80.0);
        let candidates = vec![
            BranchCandidate::new("first", here),
            BranchCandidate::new("second", here),
        ];
        let ranked = RankedBranchList::rank(center, candidates, 10);
        assert_eq!(ranked.branches[0].name, "first");
        assert_eq!(ranked.branches[1].name, "second");
    }
}
