//! Normalization of raw Modash entries into the canonical [`Creator`] shape.

use chrono::Utc;

use creatordb_core::{Creator, Platform};

use crate::error::ModashError;
use crate::types::RawCreator;

/// Converts a provider engagement-rate value to the canonical fraction unit.
///
/// Modash reports engagement as a fraction (`0.034`) on some endpoints and as
/// an already-scaled percentage (`3.4`) on others. Values above 1 are treated
/// as percentages and divided by 100; the result is clamped to `[0, 1]`.
#[must_use]
pub fn normalize_engagement_rate(raw: f64) -> f64 {
    let fraction = if raw > 1.0 { raw / 100.0 } else { raw };
    fraction.clamp(0.0, 1.0)
}

/// Converts one raw entry from a Modash response into a canonical [`Creator`].
///
/// The original JSON value is preserved in `provider_payload` for debugging
/// and later re-normalization.
///
/// # Errors
///
/// Returns [`ModashError::Deserialize`] if the entry does not match the raw
/// shape, or [`ModashError::Normalization`] if it carries neither a user id
/// nor a username.
pub fn normalize_creator(
    platform: Platform,
    entry: &serde_json::Value,
) -> Result<Creator, ModashError> {
    let raw: RawCreator =
        serde_json::from_value(entry.clone()).map_err(|e| ModashError::Deserialize {
            context: format!("{platform} creator entry"),
            source: e,
        })?;

    let username = raw.username.clone();
    let external_id = raw
        .user_id
        .map(super::types::RawId::into_string)
        .or_else(|| username.clone())
        .ok_or_else(|| ModashError::Normalization {
            reason: format!("{platform} entry has neither user id nor username"),
        })?;
    let username = username.unwrap_or_else(|| external_id.clone());

    let has_contact_details = raw
        .has_contact_details
        .unwrap_or(!raw.contacts.is_empty());

    Ok(Creator {
        platform,
        external_id,
        username,
        display_name: raw.display_name,
        profile_image_url: raw.profile_image_url,
        followers: raw.followers.unwrap_or(0),
        following: raw.following,
        posts: raw.posts,
        engagement_rate: raw.engagement_rate.map(normalize_engagement_rate),
        avg_likes: raw.avg_likes,
        avg_views: raw.avg_views,
        is_verified: raw.is_verified.unwrap_or(false),
        has_contact_details,
        audience_country: raw.country,
        audience_city: raw.city,
        biography: raw.bio,
        external_url: raw.url,
        category: raw.category,
        provider_payload: Some(entry.clone()),
        fetched_at: Utc::now(),
    })
}
