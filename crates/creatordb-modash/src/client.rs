//! HTTP client for the Modash REST API.
//!
//! Wraps `reqwest` with Modash-specific error handling, bearer-token auth,
//! and response normalization. Rate limits are detected both from HTTP 429
//! (honoring `Retry-After`) and from the `"error": true` envelope when the
//! message mentions a rate limit, because Modash has used both signals.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use creatordb_core::{Creator, Platform, SearchFilters};

use crate::error::ModashError;
use crate::normalize::normalize_creator;
use crate::types::{RawProfileResponse, RawSearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.modash.io/";

/// Provider key used for cooldown persistence and logging.
pub const PROVIDER_NAME: &str = "modash";

/// Client for the Modash REST API.
///
/// Manages the HTTP client, API token, and base URL. Use [`ModashClient::new`]
/// for production or [`ModashClient::with_base_url`] to point at a mock
/// server in tests.
pub struct ModashClient {
    client: Client,
    api_token: String,
    base_url: Url,
}

impl ModashClient {
    /// Creates a new client pointed at the production Modash API.
    ///
    /// # Errors
    ///
    /// Returns [`ModashError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_token: &str, timeout_secs: u64) -> Result<Self, ModashError> {
        Self::with_base_url(api_token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ModashError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ModashError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ModashError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("creatordb/0.1 (creator-search)")
            .build()?;

        // Normalise: exactly one trailing slash so joined paths resolve under
        // the base rather than replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ModashError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_token: api_token.to_owned(),
            base_url,
        })
    }

    /// Filter-based discovery search (`POST /v1/{platform}/search`).
    ///
    /// Accepts the full filter set and returns one page of normalized
    /// creators. Entries that fail to normalize are skipped.
    ///
    /// # Errors
    ///
    /// - [`ModashError::RateLimited`] on HTTP 429 or a rate-limit message.
    /// - [`ModashError::ApiError`] if the API reports an error.
    /// - [`ModashError::Http`] on network failure.
    /// - [`ModashError::Deserialize`] if the envelope does not parse.
    pub async fn discovery_search(
        &self,
        platform: Platform,
        filters: &SearchFilters,
        limit: u32,
        page: u32,
    ) -> Result<Vec<Creator>, ModashError> {
        let url = self.endpoint(&format!("v1/{platform}/search"))?;
        let body = serde_json::json!({
            "page": page,
            "limit": limit,
            "filter": { "influencer": influencer_filter(filters) },
        });

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;
        let value = Self::triage(response, &url).await?;
        Self::check_api_error(&value)?;

        let envelope: RawSearchResponse =
            serde_json::from_value(value).map_err(|e| ModashError::Deserialize {
                context: format!("discovery search ({platform})"),
                source: e,
            })?;

        Ok(Self::normalize_entries(platform, &envelope.users))
    }

    /// Free-text creator search (`GET /v1/{platform}/users`).
    ///
    /// # Errors
    ///
    /// Same error surface as [`ModashClient::discovery_search`].
    pub async fn text_search(
        &self,
        platform: Platform,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Creator>, ModashError> {
        let mut url = self.endpoint(&format!("v1/{platform}/users"))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &limit.to_string());

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let value = Self::triage(response, &url).await?;
        Self::check_api_error(&value)?;

        let envelope: RawSearchResponse =
            serde_json::from_value(value).map_err(|e| ModashError::Deserialize {
                context: format!("text search ({platform}, query={query})"),
                source: e,
            })?;

        Ok(Self::normalize_entries(platform, &envelope.users))
    }

    /// Direct profile report for an exact handle
    /// (`GET /v1/{platform}/profile/{handle}/report`).
    ///
    /// Returns `Ok(None)` when the profile does not exist; this is the
    /// expected miss outcome of the `@handle` fast path, not an error.
    ///
    /// # Errors
    ///
    /// Same error surface as [`ModashClient::discovery_search`].
    pub async fn profile_report(
        &self,
        platform: Platform,
        handle: &str,
    ) -> Result<Option<Creator>, ModashError> {
        let url = self.endpoint(&format!("v1/{platform}/profile/{handle}/report"))?;

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let value = match Self::triage(response, &url).await {
            Ok(value) => value,
            Err(ModashError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        Self::check_api_error(&value)?;

        let envelope: RawProfileResponse =
            serde_json::from_value(value).map_err(|e| ModashError::Deserialize {
                context: format!("profile report ({platform}, handle={handle})"),
                source: e,
            })?;

        match envelope.profile {
            Some(profile) => normalize_creator(platform, &profile).map(Some),
            None => Ok(None),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ModashError> {
        self.base_url
            .join(path)
            .map_err(|e| ModashError::ApiError(format!("invalid endpoint path '{path}': {e}")))
    }

    /// Maps non-2xx statuses to typed errors and parses the body as JSON.
    async fn triage(
        response: reqwest::Response,
        url: &Url,
    ) -> Result<serde_json::Value, ModashError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ModashError::RateLimited { retry_after_secs });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ModashError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ModashError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ModashError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Checks the `"error"` field of an envelope and converts the message into
    /// either a rate-limit error or a generic API error.
    fn check_api_error(body: &serde_json::Value) -> Result<(), ModashError> {
        if body.get("error").and_then(serde_json::Value::as_bool) != Some(true) {
            return Ok(());
        }
        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        if message.to_ascii_lowercase().contains("rate limit") {
            return Err(ModashError::RateLimited {
                retry_after_secs: None,
            });
        }
        Err(ModashError::ApiError(message))
    }

    fn normalize_entries(platform: Platform, entries: &[serde_json::Value]) -> Vec<Creator> {
        entries
            .iter()
            .filter_map(|entry| match normalize_creator(platform, entry) {
                Ok(creator) => Some(creator),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unnormalizable creator entry");
                    None
                }
            })
            .collect()
    }
}

/// Maps the canonical filter set onto Modash's `filter.influencer` object.
fn influencer_filter(filters: &SearchFilters) -> serde_json::Value {
    let mut influencer = serde_json::Map::new();

    if filters.followers_min.is_some() || filters.followers_max.is_some() {
        influencer.insert(
            "followers".to_string(),
            serde_json::json!({ "min": filters.followers_min, "max": filters.followers_max }),
        );
    }
    if filters.engagement_min.is_some() || filters.engagement_max.is_some() {
        influencer.insert(
            "engagementRate".to_string(),
            serde_json::json!({ "min": filters.engagement_min, "max": filters.engagement_max }),
        );
    }
    if let Some(verified) = filters.verified {
        influencer.insert("isVerified".to_string(), serde_json::json!(verified));
    }
    if let Some(has_contact) = filters.has_contact_details {
        influencer.insert("hasContactDetails".to_string(), serde_json::json!(has_contact));
    }
    if let Some(keyword) = &filters.keyword {
        influencer.insert("keywords".to_string(), serde_json::json!(keyword));
    }
    if !filters.hashtags.is_empty() {
        influencer.insert("hashtags".to_string(), serde_json::json!(filters.hashtags));
    }
    if !filters.interests.is_empty() {
        influencer.insert("interests".to_string(), serde_json::json!(filters.interests));
    }
    if let Some(location) = &filters.location {
        influencer.insert("location".to_string(), serde_json::json!(location));
    }

    serde_json::Value::Object(influencer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influencer_filter_omits_unconstrained_fields() {
        let value = influencer_filter(&SearchFilters::default());
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn influencer_filter_maps_ranges_and_flags() {
        let filters = SearchFilters {
            followers_min: Some(10_000),
            engagement_min: Some(0.02),
            verified: Some(true),
            hashtags: vec!["fitness".to_string()],
            ..SearchFilters::default()
        };
        let value = influencer_filter(&filters);
        assert_eq!(value["followers"]["min"], 10_000);
        assert!(value["followers"]["max"].is_null());
        assert_eq!(value["engagementRate"]["min"], 0.02);
        assert_eq!(value["isVerified"], true);
        assert_eq!(value["hashtags"][0], "fitness");
    }

    #[test]
    fn check_api_error_passes_clean_envelopes() {
        let body = serde_json::json!({ "error": false, "users": [] });
        assert!(ModashClient::check_api_error(&body).is_ok());
    }

    #[test]
    fn check_api_error_detects_rate_limit_message() {
        let body = serde_json::json!({ "error": true, "message": "Rate limit exceeded, slow down" });
        let err = ModashClient::check_api_error(&body).unwrap_err();
        assert!(matches!(err, ModashError::RateLimited { retry_after_secs: None }));
    }

    #[test]
    fn check_api_error_surfaces_other_messages() {
        let body = serde_json::json!({ "error": true, "message": "invalid token" });
        let err = ModashClient::check_api_error(&body).unwrap_err();
        assert!(matches!(err, ModashError::ApiError(ref m) if m == "invalid token"));
    }
}
