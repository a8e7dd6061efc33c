//! Offline unit tests for creatordb-db pool configuration and row types.
//! These tests do not require a live database connection.

use creatordb_core::{AppConfig, Environment};
use creatordb_db::{CreatorRow, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        modash_api_token: None,
        modash_base_url: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        provider_request_timeout_secs: 30,
        provider_cooldown_secs: 60,
        search_sufficiency_threshold: 5,
        suggest_min_interval_ms: 300,
        suggest_limit: 10,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`CreatorRow`] has all expected
/// fields with the correct types, and converts into the canonical shape.
/// No database required.
#[test]
fn creator_row_converts_to_canonical_creator() {
    use chrono::Utc;
    use creatordb_core::Platform;
    use uuid::Uuid;

    let row = CreatorRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        platform: "instagram".to_string(),
        external_id: "ext-1".to_string(),
        username: "janedoe".to_string(),
        display_name: Some("Jane Doe".to_string()),
        profile_image_url: None,
        followers: 120_000,
        following: Some(310),
        posts: Some(842),
        engagement_rate: Some(0.034),
        avg_likes: Some(4_100.0),
        avg_views: None,
        is_verified: true,
        has_contact_details: false,
        audience_country: Some("US".to_string()),
        audience_city: None,
        biography: Some("fitness and travel".to_string()),
        external_url: None,
        category: Some("fitness".to_string()),
        provider_payload: Some(serde_json::json!({"userId": "ext-1"})),
        fetched_at: Utc::now(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let creator = row.into_creator().expect("valid platform");
    assert_eq!(creator.platform, Platform::Instagram);
    assert_eq!(creator.external_id, "ext-1");
    assert_eq!(creator.username, "janedoe");
    assert_eq!(creator.followers, 120_000);
    assert_eq!(creator.engagement_rate, Some(0.034));
    assert!(creator.is_verified);
}

#[test]
fn creator_row_with_unknown_platform_is_an_error() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = CreatorRow {
        id: 7_i64,
        public_id: Uuid::new_v4(),
        platform: "myspace".to_string(),
        external_id: "x".to_string(),
        username: "x".to_string(),
        display_name: None,
        profile_image_url: None,
        followers: 0,
        following: None,
        posts: None,
        engagement_rate: None,
        avg_likes: None,
        avg_views: None,
        is_verified: false,
        has_contact_details: false,
        audience_country: None,
        audience_city: None,
        biography: None,
        external_url: None,
        category: None,
        provider_payload: None,
        fetched_at: Utc::now(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let err = row.into_creator().unwrap_err();
    assert!(
        err.to_string().contains("myspace"),
        "error should name the bad value: {err}"
    );
}
