//! Canonical creator types shared by every layer above the provider adapters.
//!
//! Provider responses are normalized into [`Creator`] at the adapter boundary;
//! no other crate ever sees provider-specific field names or units.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Social platform a creator profile lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::Tiktok),
            "youtube" => Ok(Platform::Youtube),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// A creator profile in canonical shape.
///
/// Identity key is `(platform, external_id)`; everything else is the most
/// recently fetched snapshot. `engagement_rate` is always a fraction in
/// `[0, 1]` — percentage conversion happens in the provider adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub platform: Platform,
    pub external_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub followers: i64,
    pub following: Option<i64>,
    pub posts: Option<i64>,
    pub engagement_rate: Option<f64>,
    pub avg_likes: Option<f64>,
    pub avg_views: Option<f64>,
    pub is_verified: bool,
    pub has_contact_details: bool,
    pub audience_country: Option<String>,
    pub audience_city: Option<String>,
    pub biography: Option<String>,
    pub external_url: Option<String>,
    pub category: Option<String>,
    /// Opaque provider-specific payload, kept for debugging and re-normalization.
    pub provider_payload: Option<serde_json::Value>,
    pub fetched_at: DateTime<Utc>,
}

impl Creator {
    /// Minimal creator with identity fields set and everything else empty.
    #[must_use]
    pub fn new(platform: Platform, external_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            platform,
            external_id: external_id.into(),
            username: username.into(),
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
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("Instagram".parse::<Platform>(), Ok(Platform::Instagram));
        assert_eq!(" TIKTOK ".parse::<Platform>(), Ok(Platform::Tiktok));
        assert_eq!("youtube".parse::<Platform>(), Ok(Platform::Youtube));
    }

    #[test]
    fn platform_rejects_unknown_values() {
        let err = "twitch".parse::<Platform>().unwrap_err();
        assert_eq!(err, UnknownPlatform("twitch".to_string()));
    }

    #[test]
    fn platform_display_round_trips() {
        for p in [Platform::Instagram, Platform::Tiktok, Platform::Youtube] {
            assert_eq!(p.to_string().parse::<Platform>(), Ok(p));
        }
    }

    #[test]
    fn platform_serde_uses_lowercase() {
        let json = serde_json::to_string(&Platform::Instagram).expect("serialize");
        assert_eq!(json, "\"instagram\"");
        let back: Platform = serde_json::from_str("\"tiktok\"").expect("deserialize");
        assert_eq!(back, Platform::Tiktok);
    }

    #[test]
    fn creator_new_sets_identity_and_defaults() {
        let c = Creator::new(Platform::Instagram, "123", "janedoe");
        assert_eq!(c.platform, Platform::Instagram);
        assert_eq!(c.external_id, "123");
        assert_eq!(c.username, "janedoe");
        assert_eq!(c.followers, 0);
        assert!(!c.is_verified);
        assert!(c.engagement_rate.is_none());
    }
}
