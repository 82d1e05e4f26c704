use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{PlaceField, PlaceSearch, RawPlace};
use crate::Result;
use crate::config::PlacesConfig;
use crate::error::BranchFinderError;
use crate::models::Coordinate;

/// Places API (New) text search client
pub struct GooglePlacesClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest<'a> {
    text_query: &'a str,
    max_result_count: u32,
}

/// Text search response; `places` is omitted entirely when nothing matched
#[derive(Debug, Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<ApiPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPlace {
    id: Option<String>,
    display_name: Option<LocalizedText>,
    name: Option<String>,
    location: Option<LatLng>,
    google_maps_uri: Option<String>,
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl GooglePlacesClient {
    /// Create a client from configuration. An API key is required.
    pub fn new(config: &PlacesConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| BranchFinderError::config("Places API key is not configured"))?;

        Self::with_base_url(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(u64::from(config.timeout_seconds)),
            config.max_retries,
        )
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("branch-finder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BranchFinderError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn field_mask(fields: &[PlaceField]) -> String {
        fields
            .iter()
            .map(|field| format!("places.{}", field.api_name()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    #[tracing::instrument(name = "places_search_text", level = "debug", skip(self, fields))]
    async fn search_by_text(
        &self,
        query: &str,
        fields: &[PlaceField],
        max_results: u32,
    ) -> Result<Vec<RawPlace>> {
        let url = format!("{}/places:searchText", self.base_url);
        let body = SearchTextRequest {
            text_query: query,
            max_result_count: max_results,
        };

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", Self::field_mask(fields))
            .json(&body)
            .send()
            .await
            .map_err(|e| BranchFinderError::collaborator(format!("Places request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return match status.as_u16() {
                401 | 403 => Err(BranchFinderError::permission_denied(format!(
                    "Places API rejected the API key ({status})"
                ))),
                429 => Err(BranchFinderError::collaborator(
                    "Places API rate limit exceeded",
                )),
                _ => Err(BranchFinderError::collaborator(format!(
                    "Places API error {status}: {error_text}"
                ))),
            };
        }

        let search_response: SearchTextResponse = response.json().await.map_err(|e| {
            BranchFinderError::collaborator(format!("Failed to parse Places response: {e}"))
        })?;

        debug!("Places response contained {} results", search_response.places.len());
        let places: Vec<RawPlace> = search_response
            .places
            .into_iter()
            .map(ApiPlace::into_raw)
            .collect();

        info!("Found {} places for query '{}'", places.len(), query);
        Ok(places)
    }
}

impl ApiPlace {
    fn into_raw(self) -> RawPlace {
        let location = self.location.and_then(|latlng| {
            Some(Coordinate::new(latlng.latitude?, latlng.longitude?))
        });

        RawPlace {
            id: self.id,
            display_name: self.display_name.and_then(|text| text.text),
            // `name` is the `places/<id>` resource path here, never a label
            name: self.name.filter(|name| !name.starts_with("places/")),
            location,
            maps_uri: self.google_maps_uri,
            formatted_address: self.formatted_address,
        }
    }
}
