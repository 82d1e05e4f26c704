//! Integration tests for branch resolution against a mocked places API

use std::sync::Arc;
use std::time::Duration;

use branch_finder::{
    BranchFinderError, BranchSearchRanker, Coordinate, FixedPositionSource, GooglePlacesClient,
    LocationResolver, PlaceField, PlaceSearch, UnavailablePositionSource,
};
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COLOMBO: Coordinate = Coordinate::new(6.9271, 79.8612);

fn test_client(base_url: &str) -> GooglePlacesClient {
    GooglePlacesClient::with_base_url("test-key", base_url, Duration::from_secs(5), 0)
        .expect("client construction should not fail")
}

fn branch(id: &str, name: &str, lat: f64, lng: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "displayName": { "text": name, "languageCode": "en" },
        "location": { "latitude": lat, "longitude": lng },
        "googleMapsUri": format!("https://maps.google.com/?cid={id}"),
        "formattedAddress": format!("{name}, Sri Lanka")
    })
}

#[tokio::test]
async fn search_text_sends_query_key_and_field_mask() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .and(header("X-Goog-Api-Key", "test-key"))
        .and(header_exists("X-Goog-FieldMask"))
        .and(body_partial_json(serde_json::json!({
            "textQuery": "People's Bank near 6.9271,79.8612",
            "maxResultCount": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "places": [branch("a", "People's Bank - Colombo Fort", 6.9344, 79.8428)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ranker = BranchSearchRanker::new(Arc::new(test_client(&server.uri())));
    let ranked = ranker.search_nearby(COLOMBO).await;

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked.branches[0].name, "People's Bank - Colombo Fort");
    assert_eq!(
        ranked.branches[0].map_link(),
        "https://maps.google.com/?cid=a"
    );
}

#[tokio::test]
async fn ranker_filters_and_sorts_api_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "places": [
                branch("kandy", "People's Bank - Kandy", 7.2906, 80.6337),
                { "id": "nolocation", "displayName": { "text": "People's Bank - Kegalle" } },
                branch("city", "City Bank", 6.9271, 79.8612),
                branch("london", "People's Bank - London", 51.5074, -0.1278),
                branch("colombo", "People's Bank - Colombo Branch", 6.9271, 79.8612)
            ]
        })))
        .mount(&server)
        .await;

    let ranker = BranchSearchRanker::new(Arc::new(test_client(&server.uri())));
    let ranked = ranker.search_nearby(COLOMBO).await;
    let ids: Vec<&str> = ranked
        .iter()
        .filter_map(|b| b.place_id.as_deref())
        .collect();

    assert_eq!(ids, vec!["colombo", "kandy"]);
}

#[tokio::test]
async fn empty_api_response_gives_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let ranker = BranchSearchRanker::new(Arc::new(test_client(&server.uri())));
    assert!(ranker.search_nearby(COLOMBO).await.is_empty());
}

#[tokio::test]
async fn server_error_gives_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let ranker = BranchSearchRanker::new(Arc::new(test_client(&server.uri())));
    assert!(ranker.search_nearby(COLOMBO).await.is_empty());
}

#[tokio::test]
async fn malformed_body_gives_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let ranker = BranchSearchRanker::new(Arc::new(test_client(&server.uri())));
    assert!(ranker.search_nearby(COLOMBO).await.is_empty());
}

#[tokio::test]
async fn client_maps_http_status_to_error_kind() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_by_text("People's Bank", &PlaceField::BRANCH_FIELDS, 30)
        .await
        .unwrap_err();
    assert!(
        matches!(err, BranchFinderError::PermissionDenied { .. }),
        "expected PermissionDenied, got: {err:?}"
    );
}

#[tokio::test]
async fn client_reports_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_by_text("People's Bank", &PlaceField::BRANCH_FIELDS, 30)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rate limit"));
}

#[tokio::test]
async fn unreachable_server_gives_empty_list() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let ranker = BranchSearchRanker::new(Arc::new(test_client(&uri)));
    assert!(ranker.search_nearby(COLOMBO).await.is_empty());
}

#[tokio::test]
async fn resolver_and_ranker_work_together() {
    let server = MockServer::start().await;
    let kandy = Coordinate::new(7.2906, 80.6337);

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .and(body_partial_json(serde_json::json!({
            "textQuery": "People's Bank near 7.2906,80.6337"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "places": [
                branch("colombo", "People's Bank - Colombo Branch", 6.9271, 79.8612),
                branch("kandy", "People's Bank - Kandy", 7.2906, 80.6337)
            ]
        })))
        .mount(&server)
        .await;

    let resolver = LocationResolver::new(Arc::new(FixedPositionSource::new(kandy)));
    let ranker = BranchSearchRanker::new(Arc::new(test_client(&server.uri())));

    let center = resolver.resolve_location().await;
    let ranked = ranker.search_nearby(center).await;

    assert_eq!(center, kandy);
    assert_eq!(
        ranked.nearest().and_then(|b| b.place_id.as_deref()),
        Some("kandy")
    );
}

#[tokio::test]
async fn unavailable_location_searches_around_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .and(body_partial_json(serde_json::json!({
            "textQuery": "People's Bank near 7.8731,80.7718"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "places": [branch("dambulla", "People's Bank - Dambulla", 7.8600, 80.6517)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = LocationResolver::new(Arc::new(UnavailablePositionSource));
    let ranker = BranchSearchRanker::new(Arc::new(test_client(&server.uri())));

    let center = resolver.resolve_location().await;
    let ranked = ranker.search_nearby(center).await;

    assert_eq!(center, LocationResolver::FALLBACK);
    assert_eq!(ranked.len(), 1);
}
