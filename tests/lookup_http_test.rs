//! HTTP lookup provider tests against a mock provider server

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use PlanBuddy::config::LookupConfig;
use PlanBuddy::models::PollKind;
use PlanBuddy::services::{HttpLookupProvider, LookupProvider};
use PlanBuddy::utils::errors::LookupError;

fn config_for(server: &MockServer, timeout_seconds: u64) -> LookupConfig {
    LookupConfig {
        place_api_url: server.uri(),
        movie_api_url: server.uri(),
        timeout_seconds,
    }
}

#[tokio::test]
async fn test_place_search_normalizes_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "cafe connaught place"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "p1", "name": "Cafe A", "address": "Block A", "rating": 4.2,
                 "latitude": 28.63, "longitude": 77.22},
                {"id": "p2", "name": "Cafe B", "description": "bakery"}
            ]
        })))
        .mount(&server)
        .await;

    let provider = HttpLookupProvider::new(config_for(&server, 5)).unwrap();
    let candidates = provider.search_places("cafe connaught place").await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].title, "Cafe A");
    assert_eq!(candidates[0].description, "Block A");
    assert_eq!(candidates[0].rating, Some(4.2));
    assert_eq!(candidates[0].extra.latitude, Some(28.63));
    assert_eq!(candidates[0].extra.source, PollKind::Place);
    assert_eq!(candidates[1].description, "bakery");
}

#[tokio::test]
async fn test_movie_search_passes_genres() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("genres", "crime,thriller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "m7", "title": "Heat", "overview": "Crime drama",
                 "rating": 8.3, "release_date": "1995-12-15",
                 "genres": ["crime", "thriller"]}
            ]
        })))
        .mount(&server)
        .await;

    let provider = HttpLookupProvider::new(config_for(&server, 5)).unwrap();
    let candidates = provider
        .search_movies_by_genres(&["crime".to_string(), "thriller".to_string()])
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title, "Heat");
    assert_eq!(candidates[0].extra.source, PollKind::Movie);
    assert_eq!(candidates[0].extra.release_date.as_deref(), Some("1995-12-15"));
}

#[tokio::test]
async fn test_server_error_is_request_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let provider = HttpLookupProvider::new(config_for(&server, 5)).unwrap();
    let result = provider.search_places("cafe").await;

    assert_matches!(result, Err(LookupError::RequestFailed(_)));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = HttpLookupProvider::new(config_for(&server, 5)).unwrap();
    let result = provider.search_places("cafe").await;

    assert_matches!(result, Err(LookupError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let provider = HttpLookupProvider::new(config_for(&server, 1)).unwrap();
    let result = provider.search_places("cafe").await;

    assert_matches!(result, Err(LookupError::Timeout));
}
