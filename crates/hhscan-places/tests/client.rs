//! Integration tests for `PlacesClient` using wiremock HTTP mocks.

use hhscan_core::{BusinessStatus, LatLng};
use hhscan_places::{PlacesClient, PlacesError, DETAIL_FIELD_MASK, NEARBY_FIELD_MASK};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Matches the whole field-mask header; `header()` would split it on commas.
fn field_mask(expected: &'static str) -> impl Fn(&Request) -> bool + Send + Sync {
    move |req: &Request| {
        req.headers
            .get("X-Goog-FieldMask")
            .and_then(|v| v.to_str().ok())
            == Some(expected)
    }
}

fn test_client(base_url: &str) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 30, "hhscan-test", base_url)
        .expect("client construction should not fail")
        .with_included_types(vec!["restaurant".to_string(), "bar".to_string()])
}

#[tokio::test]
async fn search_nearby_sends_headers_and_circle_body() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "places": [
            {
                "id": "p1",
                "displayName": { "text": "Bar One" },
                "location": { "latitude": 30.01, "longitude": -97.01 },
                "businessStatus": "OPERATIONAL",
                "regularSecondaryOpeningHours": [{ "secondaryHoursType": "HAPPY_HOUR" }]
            },
            {
                "id": "p2",
                "businessStatus": "CLOSED_PERMANENTLY"
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .and(header("X-Goog-Api-Key", "test-key"))
        .and(field_mask(NEARBY_FIELD_MASK))
        .and(body_partial_json(serde_json::json!({
            "includedTypes": ["restaurant", "bar"],
            "locationRestriction": {
                "circle": {
                    "center": { "latitude": 30.0, "longitude": -97.0 },
                    "radius": 708.0
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_nearby(LatLng::new(30.0, -97.0), 707.1)
        .await
        .expect("should parse candidates");
    let candidates = &page.candidates;

    assert_eq!(page.returned, 2);
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].place_id(), Some("p1"));
    assert!(candidates[0].has_secondary_hours("happy_hour"));
    assert_eq!(
        candidates[1].business_status,
        Some(BusinessStatus::ClosedPermanently)
    );
}

#[tokio::test]
async fn search_nearby_without_places_key_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_nearby(LatLng::new(30.0, -97.0), 500.0)
        .await
        .expect("empty envelope is valid");
    assert_eq!(page.returned, 0);
    assert!(page.candidates.is_empty());
}

#[tokio::test]
async fn search_nearby_skips_malformed_entries() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "places": [
            { "id": "good" },
            { "id": 42, "businessStatus": ["not", "a", "string"] },
            { "id": "also-good" }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_nearby(LatLng::new(30.0, -97.0), 500.0)
        .await
        .expect("envelope parses");
    let ids: Vec<_> = page.candidates.iter().filter_map(|c| c.place_id()).collect();
    assert_eq!(ids, vec!["good", "also-good"]);
    assert_eq!(page.returned, 3);
}

#[tokio::test]
async fn search_nearby_counts_every_returned_entry() {
    let server = MockServer::start().await;

    let mut places: Vec<_> = (0..19)
        .map(|i| serde_json::json!({ "id": format!("p{i}") }))
        .collect();
    places.push(serde_json::json!({ "id": "odd", "location": "nowhere" }));

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "places": places })),
        )
        .mount(&server)
        .await;

    let page = test_client(&server.uri())
        .search_nearby(LatLng::new(30.0, -97.0), 500.0)
        .await
        .expect("envelope parses");
    assert_eq!(page.returned, 20);
    assert_eq!(page.candidates.len(), 19);
}

#[tokio::test]
async fn search_nearby_accepts_null_secondary_hours() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "places": [{ "id": "p1", "regularSecondaryOpeningHours": null }]
        })))
        .mount(&server)
        .await;

    let page = test_client(&server.uri())
        .search_nearby(LatLng::new(30.0, -97.0), 500.0)
        .await
        .expect("envelope parses");
    assert_eq!(page.returned, 1);
    assert_eq!(page.candidates.len(), 1);
}

#[tokio::test]
async fn search_nearby_maps_non_2xx_to_unexpected_status() {
    let server = MockServer::start().await;

    let long_body = "x".repeat(500);
    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(429).set_body_string(long_body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_nearby(LatLng::new(30.0, -97.0), 500.0)
        .await
        .expect_err("429 should fail");

    match err {
        PlacesError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 429);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn search_nearby_maps_garbage_body_to_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_nearby(LatLng::new(30.0, -97.0), 500.0)
        .await
        .expect_err("html should fail");
    assert!(matches!(err, PlacesError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn get_place_returns_typed_fields_and_raw_payload() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "p1",
        "displayName": { "text": "Bar One", "languageCode": "en" },
        "formattedAddress": "1 Main St",
        "rating": 4.2,
        "userRatingCount": 10,
        "types": ["bar"],
        "businessStatus": "OPERATIONAL",
        "someNewField": "kept"
    });

    Mock::given(method("GET"))
        .and(path("/places/p1"))
        .and(header("X-Goog-Api-Key", "test-key"))
        .and(field_mask(DETAIL_FIELD_MASK))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let detail = client.get_place("p1").await.expect("should parse detail");

    assert_eq!(detail.place_id(), Some("p1"));
    assert_eq!(detail.display_name(), Some("Bar One"));
    assert_eq!(detail.fields.formatted_address.as_deref(), Some("1 Main St"));
    assert_eq!(detail.fields.user_rating_count, Some(10));
    assert_eq!(detail.raw["someNewField"], "kept");
}

#[tokio::test]
async fn get_place_empty_object_is_reported_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/places/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let detail = client.get_place("p1").await.expect("empty object parses");
    assert!(detail.is_empty());
}

#[tokio::test]
async fn get_place_not_found_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/places/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_place("missing").await.expect_err("404 should fail");
    assert!(
        matches!(err, PlacesError::UnexpectedStatus { status: 404, ref body, .. } if body == "not found"),
        "got {err:?}"
    );
}
