//! Raw Modash response shapes.
//!
//! The serde `alias` attributes are the field-mapping table for this
//! provider: Modash has shipped both camelCase and snake_case variants of
//! several fields across endpoints, so every known spelling maps onto one
//! canonical raw field here. Nothing outside this crate sees these types.

use serde::Deserialize;

/// A creator id that Modash returns either as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Num(i64),
    Str(String),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Num(n) => n.to_string(),
            RawId::Str(s) => s,
        }
    }
}

/// One creator entry as returned by the search and report endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCreator {
    #[serde(alias = "userId", alias = "user_id", alias = "id")]
    pub user_id: Option<RawId>,
    pub username: Option<String>,
    #[serde(alias = "fullname", alias = "full_name", alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(alias = "picture", alias = "profilePicUrl", alias = "profile_pic_url")]
    pub profile_image_url: Option<String>,
    #[serde(alias = "follower_count", alias = "followerCount")]
    pub followers: Option<i64>,
    #[serde(alias = "following_count", alias = "followingCount")]
    pub following: Option<i64>,
    #[serde(alias = "postsCount", alias = "posts_count")]
    pub posts: Option<i64>,
    #[serde(alias = "engagementRate", alias = "engagement_rate")]
    pub engagement_rate: Option<f64>,
    #[serde(alias = "avgLikes", alias = "average_likes")]
    pub avg_likes: Option<f64>,
    #[serde(alias = "avgViews", alias = "average_views")]
    pub avg_views: Option<f64>,
    #[serde(alias = "isVerified", alias = "verified")]
    pub is_verified: Option<bool>,
    #[serde(alias = "hasContactDetails", alias = "has_contact_details")]
    pub has_contact_details: Option<bool>,
    #[serde(default)]
    pub contacts: Vec<serde_json::Value>,
    #[serde(alias = "audienceCountry", alias = "audience_country")]
    pub country: Option<String>,
    #[serde(alias = "audienceCity", alias = "audience_city")]
    pub city: Option<String>,
    #[serde(alias = "biography")]
    pub bio: Option<String>,
    #[serde(alias = "website", alias = "externalUrl", alias = "external_url")]
    pub url: Option<String>,
    #[serde(alias = "niche")]
    pub category: Option<String>,
}

/// Envelope shared by the search and users endpoints.
///
/// The `error`/`message` pair is checked on the raw JSON value before this
/// type is ever deserialized, so only the payload fields live here.
#[derive(Debug, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default, alias = "lookalikes", alias = "results")]
    pub users: Vec<serde_json::Value>,
}

/// Envelope of the profile report endpoint.
#[derive(Debug, Deserialize)]
pub struct RawProfileResponse {
    pub profile: Option<serde_json::Value>,
}
