//! Handlers for the creator search, suggestion, and lookup routes.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use creatordb_core::{Creator, Platform, SearchFilters, SearchOutcome};
use creatordb_search::{ProviderError, SearchRequest};

use super::{normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    platform: String,
    q: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    force_remote: Option<bool>,
    followers_min: Option<i64>,
    followers_max: Option<i64>,
    engagement_min: Option<f64>,
    engagement_max: Option<f64>,
    verified: Option<bool>,
    has_contact_details: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    platform: String,
    q: Option<String>,
}

fn parse_platform(request_id: &str, raw: &str) -> Result<Platform, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("unknown platform '{raw}'; expected instagram, tiktok, or youtube"),
        )
    })
}

/// `GET /api/v1/creators/search` — the orchestrated search path.
pub async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchOutcome>>, ApiError> {
    let platform = parse_platform(&req_id.0, &params.platform)?;

    let request = SearchRequest {
        platform,
        query: params.q,
        filters: SearchFilters {
            followers_min: params.followers_min,
            followers_max: params.followers_max,
            engagement_min: params.engagement_min,
            engagement_max: params.engagement_max,
            verified: params.verified,
            has_contact_details: params.has_contact_details,
            ..SearchFilters::default()
        },
        limit: normalize_limit(params.limit),
        offset: u32::try_from(params.offset.unwrap_or(0).max(0)).unwrap_or(0),
        force_remote: params.force_remote.unwrap_or(false),
    };

    let outcome = state.coordinator.search(&request).await;
    Ok(Json(ApiResponse {
        data: outcome,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/creators/suggest` — debounced typeahead path.
pub async fn suggest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<ApiResponse<SearchOutcome>>, ApiError> {
    let platform = parse_platform(&req_id.0, &params.platform)?;
    let outcome = state
        .coordinator
        .suggest(platform, params.q.as_deref().unwrap_or(""))
        .await;
    Ok(Json(ApiResponse {
        data: outcome,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/creators/{platform}/{handle}` — exact-handle lookup with
/// store write-back.
pub async fn lookup(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((platform, handle)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Creator>>, ApiError> {
    let platform = parse_platform(&req_id.0, &platform)?;

    match state.coordinator.lookup_profile(platform, &handle).await {
        Ok(Some(creator)) => Ok(Json(ApiResponse {
            data: creator,
            meta: ResponseMeta::new(req_id.0),
        })),
        Ok(None) => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no {platform} profile found for '{handle}'"),
        )),
        Err(ProviderError::RateLimited { .. }) => Err(ApiError::new(
            req_id.0,
            "rate_limited",
            "discovery provider is cooling down, try again later",
        )),
        Err(e) => {
            tracing::error!(error = %e, "profile lookup failed");
            Err(ApiError::new(
                req_id.0,
                "upstream_error",
                "profile lookup failed",
            ))
        }
    }
}
