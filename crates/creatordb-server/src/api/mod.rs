mod creators;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};
use crate::AppCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub coordinator: Arc<AppCoordinator>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Clamps a caller-supplied page size to the range the orchestrator accepts.
pub(super) fn normalize_limit(limit: Option<i64>) -> u32 {
    u32::try_from(limit.unwrap_or(15).clamp(1, 50)).unwrap_or(15)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/creators/search", get(creators::search))
        .route("/api/v1/creators/suggest", get(creators::suggest))
        .route(
            "/api/v1/creators/{platform}/{handle}",
            get(creators::lookup),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match creatordb_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use creatordb_modash::ModashClient;
    use creatordb_search::{
        CoordinatorConfig, PgCooldownStore, PgCreatorStore, RateLimitSentinel, SearchCoordinator,
    };
    use tower::ServiceExt;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 15);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 50);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_rate_limited_maps_to_429() {
        let response = ApiError::new("req-1", "rate_limited", "provider cooling").into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    /// Coordinator whose provider points at a closed port; only local paths
    /// are exercised here.
    fn local_only_state(pool: PgPool) -> AppState {
        let provider = ModashClient::with_base_url("test-token", 1, "http://127.0.0.1:9")
            .expect("client");
        let sentinel =
            RateLimitSentinel::new(PgCooldownStore::new(pool.clone()), "modash", 60);
        let coordinator = Arc::new(SearchCoordinator::new(
            PgCreatorStore::new(pool.clone()),
            provider,
            sentinel,
            CoordinatorConfig::default(),
        ));
        AppState { pool, coordinator }
    }

    async fn seed_creator(pool: &PgPool, external_id: &str, username: &str, followers: i64) {
        sqlx::query(
            "INSERT INTO creators (platform, external_id, username, followers) \
             VALUES ('instagram', $1, $2, $3)",
        )
        .bind(external_id)
        .bind(username)
        .bind(followers)
        .execute(pool)
        .await
        .expect("seed creator");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok(pool: PgPool) {
        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(local_only_state(pool), auth, default_rate_limit_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_without_query_serves_local_creators(pool: PgPool) {
        seed_creator(&pool, "c1", "bigfish", 500_000).await;
        seed_creator(&pool, "c2", "smallfry", 1_000).await;

        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(local_only_state(pool), auth, default_rate_limit_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/creators/search?platform=instagram")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["provenance"].as_str(), Some("database"));
        let creators = json["data"]["creators"].as_array().expect("creators");
        assert_eq!(creators.len(), 2);
        assert_eq!(creators[0]["username"].as_str(), Some("bigfish"));
        assert_eq!(json["data"]["total"].as_i64(), Some(2));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_rejects_unknown_platform(pool: PgPool) {
        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(local_only_state(pool), auth, default_rate_limit_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/creators/search?platform=myspace")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_applies_follower_filters(pool: PgPool) {
        seed_creator(&pool, "c1", "bigfish", 500_000).await;
        seed_creator(&pool, "c2", "smallfry", 1_000).await;

        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(local_only_state(pool), auth, default_rate_limit_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/creators/search?platform=instagram&followers_min=10000")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let creators = json["data"]["creators"].as_array().expect("creators");
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0]["username"].as_str(), Some("bigfish"));
    }
}
