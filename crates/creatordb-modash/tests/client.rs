//! Integration tests for the Modash client against a wiremock server.

use wiremock::matchers::{bearer_token, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use creatordb_core::{Platform, SearchFilters};
use creatordb_modash::{ModashClient, ModashError};

fn client_for(server: &MockServer) -> ModashClient {
    ModashClient::with_base_url("test-token", 5, &server.uri()).expect("client")
}

#[tokio::test]
async fn text_search_parses_users() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/instagram/users"))
        .and(query_param("query", "fitness"))
        .and(query_param("limit", "10"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": false,
            "users": [
                {
                    "userId": 101,
                    "username": "fitjane",
                    "fullname": "Jane Fit",
                    "followers": 250000,
                    "engagementRate": 0.041,
                    "isVerified": true
                },
                {
                    "userId": 102,
                    "username": "gymbob",
                    "followers": 48000
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let creators = client
        .text_search(Platform::Instagram, "fitness", 10)
        .await
        .expect("text search");

    assert_eq!(creators.len(), 2);
    assert_eq!(creators[0].external_id, "101");
    assert_eq!(creators[0].username, "fitjane");
    assert_eq!(creators[0].engagement_rate, Some(0.041));
    assert!(creators[0].is_verified);
    assert_eq!(creators[1].followers, 48_000);
}

#[tokio::test]
async fn text_search_skips_entries_without_identity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tiktok/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": false,
            "users": [
                { "followers": 99 },
                { "userId": "ok-1", "username": "kept" }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let creators = client
        .text_search(Platform::Tiktok, "dance", 5)
        .await
        .expect("text search");

    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0].external_id, "ok-1");
}

#[tokio::test]
async fn discovery_search_sends_filter_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/instagram/search"))
        .and(bearer_token("test-token"))
        .and(body_partial_json(serde_json::json!({
            "page": 0,
            "limit": 15,
            "filter": {
                "influencer": {
                    "followers": { "min": 10000 },
                    "hashtags": ["fitness"]
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": false,
            "total": 1,
            "users": [
                { "userId": 7, "username": "tagged", "followers": 15000 }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let filters = SearchFilters {
        followers_min: Some(10_000),
        hashtags: vec!["fitness".to_string()],
        ..SearchFilters::default()
    };
    let creators = client
        .discovery_search(Platform::Instagram, &filters, 15, 0)
        .await
        .expect("discovery search");

    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0].username, "tagged");
}

#[tokio::test]
async fn profile_report_returns_creator() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/youtube/profile/mrbeast/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": false,
            "profile": {
                "userId": "UC-x1",
                "username": "mrbeast",
                "fullname": "MrBeast",
                "followers": 200000000,
                "engagementRate": 2.1
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let creator = client
        .profile_report(Platform::Youtube, "mrbeast")
        .await
        .expect("profile report")
        .expect("profile present");

    assert_eq!(creator.external_id, "UC-x1");
    assert_eq!(creator.followers, 200_000_000);
    // Percentage input is converted to a fraction at the boundary.
    assert_eq!(creator.engagement_rate, Some(0.021));
}

#[tokio::test]
async fn profile_report_miss_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/instagram/profile/ghost/report"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let creator = client
        .profile_report(Platform::Instagram, "ghost")
        .await
        .expect("profile report");

    assert!(creator.is_none());
}

#[tokio::test]
async fn http_429_maps_to_rate_limited_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/instagram/users"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "42"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .text_search(Platform::Instagram, "anything", 10)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ModashError::RateLimited {
            retry_after_secs: Some(42)
        }
    ));
}

#[tokio::test]
async fn rate_limit_message_in_body_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/tiktok/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": true,
            "message": "Monthly rate limit exceeded"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .discovery_search(Platform::Tiktok, &SearchFilters::default(), 10, 0)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ModashError::RateLimited {
            retry_after_secs: None
        }
    ));
}

#[tokio::test]
async fn api_error_message_surfaces() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/instagram/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": true,
            "message": "insufficient credits"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .text_search(Platform::Instagram, "q", 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ModashError::ApiError(ref m) if m == "insufficient credits"));
}

#[tokio::test]
async fn unexpected_status_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/instagram/users"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .text_search(Platform::Instagram, "q", 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ModashError::UnexpectedStatus { status: 503, .. }));
}
