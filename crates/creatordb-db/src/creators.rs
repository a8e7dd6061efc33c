//! Database operations for the `creators` table.
//!
//! The local store is the cheap path of the search orchestration: remote
//! results are written back here so subsequent searches hit Postgres instead
//! of the provider.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use creatordb_core::{Creator, Platform, SearchFilters};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `creators` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatorRow {
    pub id: i64,
    pub public_id: Uuid,
    pub platform: String,
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
    pub provider_payload: Option<serde_json::Value>,
    pub fetched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreatorRow {
    /// Converts the row into the canonical [`Creator`] shape.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidPlatform`] if the stored platform string is
    /// not one of the known variants. The CHECK constraint makes this
    /// unreachable for rows written by this crate.
    pub fn into_creator(self) -> Result<Creator, DbError> {
        let platform = self
            .platform
            .parse::<Platform>()
            .map_err(|_| DbError::InvalidPlatform {
                id: self.id,
                value: self.platform.clone(),
            })?;
        Ok(Creator {
            platform,
            external_id: self.external_id,
            username: self.username,
            display_name: self.display_name,
            profile_image_url: self.profile_image_url,
            followers: self.followers,
            following: self.following,
            posts: self.posts,
            engagement_rate: self.engagement_rate,
            avg_likes: self.avg_likes,
            avg_views: self.avg_views,
            is_verified: self.is_verified,
            has_contact_details: self.has_contact_details,
            audience_country: self.audience_country,
            audience_city: self.audience_city,
            biography: self.biography,
            external_url: self.external_url,
            category: self.category,
            provider_payload: self.provider_payload,
            fetched_at: self.fetched_at,
        })
    }
}

/// One page of creators plus the exact total matching the same predicate.
#[derive(Debug, Clone)]
pub struct CreatorSearchPage {
    pub creators: Vec<Creator>,
    pub total: i64,
}

const SELECT_COLUMNS: &str = "id, public_id, platform, external_id, username, display_name, \
     profile_image_url, followers, following, posts, engagement_rate, avg_likes, avg_views, \
     is_verified, has_contact_details, audience_country, audience_city, biography, \
     external_url, category, provider_payload, fetched_at, created_at, updated_at";

const FILTER_CLAUSE: &str = "platform = $1 \
     AND ($2::TEXT IS NULL \
          OR username ILIKE '%' || $2 || '%' \
          OR display_name ILIKE '%' || $2 || '%' \
          OR biography ILIKE '%' || $2 || '%') \
     AND ($3::BIGINT IS NULL OR followers >= $3) \
     AND ($4::BIGINT IS NULL OR followers <= $4) \
     AND ($5::DOUBLE PRECISION IS NULL OR engagement_rate >= $5) \
     AND ($6::DOUBLE PRECISION IS NULL OR engagement_rate <= $6) \
     AND ($7::BOOL IS NULL OR is_verified = $7) \
     AND ($8::BOOL IS NULL OR has_contact_details = $8)";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns one page of creators ordered by follower count descending, plus
/// the exact total count for the same predicate.
///
/// The free-text `query` matches case-insensitively against username, display
/// name, and biography (OR). Range filters are inclusive on both bounds;
/// `None` filter fields are unconstrained.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails, or
/// [`DbError::InvalidPlatform`] on a corrupt row.
pub async fn search_creators(
    pool: &PgPool,
    platform: Platform,
    query: Option<&str>,
    filters: &SearchFilters,
    limit: i64,
    offset: i64,
) -> Result<CreatorSearchPage, DbError> {
    let select = format!(
        "SELECT {SELECT_COLUMNS} FROM creators WHERE {FILTER_CLAUSE} \
         ORDER BY followers DESC, id ASC LIMIT $9 OFFSET $10"
    );
    let rows = sqlx::query_as::<_, CreatorRow>(&select)
        .bind(platform.as_str())
        .bind(query)
        .bind(filters.followers_min)
        .bind(filters.followers_max)
        .bind(filters.engagement_min)
        .bind(filters.engagement_max)
        .bind(filters.verified)
        .bind(filters.has_contact_details)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count = format!("SELECT COUNT(*) FROM creators WHERE {FILTER_CLAUSE}");
    let total: i64 = sqlx::query_scalar(&count)
        .bind(platform.as_str())
        .bind(query)
        .bind(filters.followers_min)
        .bind(filters.followers_max)
        .bind(filters.engagement_min)
        .bind(filters.engagement_max)
        .bind(filters.verified)
        .bind(filters.has_contact_details)
        .fetch_one(pool)
        .await?;

    let creators = rows
        .into_iter()
        .map(CreatorRow::into_creator)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CreatorSearchPage { creators, total })
}

/// Returns a single creator by its `(platform, external_id)` identity key,
/// or `None` if not cached.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_creator(
    pool: &PgPool,
    platform: Platform,
    external_id: &str,
) -> Result<Option<Creator>, DbError> {
    let select = format!(
        "SELECT {SELECT_COLUMNS} FROM creators WHERE platform = $1 AND external_id = $2"
    );
    let row = sqlx::query_as::<_, CreatorRow>(&select)
        .bind(platform.as_str())
        .bind(external_id)
        .fetch_optional(pool)
        .await?;

    row.map(CreatorRow::into_creator).transpose()
}

/// Insert new creators and refresh existing ones by `(platform, external_id)`.
///
/// Returns `(new_count, updated_count)` where:
/// - `new_count`: rows that did not exist before (were inserted)
/// - `updated_count`: rows that already existed (were refreshed)
///
/// Uses a single `INSERT … SELECT * FROM UNNEST(…) ON CONFLICT` so that the
/// entire batch is upserted in one round-trip regardless of batch size. On
/// conflict every snapshot column is overwritten with the fresher fetch.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
#[allow(clippy::too_many_lines)] // one bind per creators column; splitting would obscure the batch
pub async fn upsert_creators(
    pool: &PgPool,
    creators: &[Creator],
) -> Result<(u64, u64), DbError> {
    if creators.is_empty() {
        return Ok((0, 0));
    }

    // Collect each column into a parallel Vec for UNNEST binding.
    let mut platforms: Vec<&str> = Vec::with_capacity(creators.len());
    let mut external_ids: Vec<String> = Vec::with_capacity(creators.len());
    let mut usernames: Vec<String> = Vec::with_capacity(creators.len());
    let mut display_names: Vec<Option<String>> = Vec::with_capacity(creators.len());
    let mut profile_image_urls: Vec<Option<String>> = Vec::with_capacity(creators.len());
    let mut followers: Vec<i64> = Vec::with_capacity(creators.len());
    let mut followings: Vec<Option<i64>> = Vec::with_capacity(creators.len());
    let mut posts: Vec<Option<i64>> = Vec::with_capacity(creators.len());
    let mut engagement_rates: Vec<Option<f64>> = Vec::with_capacity(creators.len());
    let mut avg_likes: Vec<Option<f64>> = Vec::with_capacity(creators.len());
    let mut avg_views: Vec<Option<f64>> = Vec::with_capacity(creators.len());
    let mut is_verifieds: Vec<bool> = Vec::with_capacity(creators.len());
    let mut has_contacts: Vec<bool> = Vec::with_capacity(creators.len());
    let mut audience_countries: Vec<Option<String>> = Vec::with_capacity(creators.len());
    let mut audience_cities: Vec<Option<String>> = Vec::with_capacity(creators.len());
    let mut biographies: Vec<Option<String>> = Vec::with_capacity(creators.len());
    let mut external_urls: Vec<Option<String>> = Vec::with_capacity(creators.len());
    let mut categories: Vec<Option<String>> = Vec::with_capacity(creators.len());
    let mut payloads: Vec<Option<serde_json::Value>> = Vec::with_capacity(creators.len());
    let mut fetched_ats: Vec<DateTime<Utc>> = Vec::with_capacity(creators.len());

    for c in creators {
        platforms.push(c.platform.as_str());
        external_ids.push(c.external_id.clone());
        usernames.push(c.username.clone());
        display_names.push(c.display_name.clone());
        profile_image_urls.push(c.profile_image_url.clone());
        followers.push(c.followers);
        followings.push(c.following);
        posts.push(c.posts);
        engagement_rates.push(c.engagement_rate);
        avg_likes.push(c.avg_likes);
        avg_views.push(c.avg_views);
        is_verifieds.push(c.is_verified);
        has_contacts.push(c.has_contact_details);
        audience_countries.push(c.audience_country.clone());
        audience_cities.push(c.audience_city.clone());
        biographies.push(c.biography.clone());
        external_urls.push(c.external_url.clone());
        categories.push(c.category.clone());
        payloads.push(c.provider_payload.clone());
        fetched_ats.push(c.fetched_at);
    }

    let rows: Vec<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO creators \
             (platform, external_id, username, display_name, profile_image_url, \
              followers, following, posts, engagement_rate, avg_likes, avg_views, \
              is_verified, has_contact_details, audience_country, audience_city, \
              biography, external_url, category, provider_payload, fetched_at) \
         SELECT * FROM UNNEST(\
              $1::text[], $2::text[], $3::text[], $4::text[], $5::text[], \
              $6::int8[], $7::int8[], $8::int8[], $9::float8[], $10::float8[], $11::float8[], \
              $12::bool[], $13::bool[], $14::text[], $15::text[], \
              $16::text[], $17::text[], $18::text[], $19::jsonb[], $20::timestamptz[]) \
         ON CONFLICT (platform, external_id) DO UPDATE SET \
             username            = EXCLUDED.username, \
             display_name        = EXCLUDED.display_name, \
             profile_image_url   = EXCLUDED.profile_image_url, \
             followers           = EXCLUDED.followers, \
             following           = EXCLUDED.following, \
             posts               = EXCLUDED.posts, \
             engagement_rate     = EXCLUDED.engagement_rate, \
             avg_likes           = EXCLUDED.avg_likes, \
             avg_views           = EXCLUDED.avg_views, \
             is_verified         = EXCLUDED.is_verified, \
             has_contact_details = EXCLUDED.has_contact_details, \
             audience_country    = EXCLUDED.audience_country, \
             audience_city       = EXCLUDED.audience_city, \
             biography           = EXCLUDED.biography, \
             external_url        = EXCLUDED.external_url, \
             category            = EXCLUDED.category, \
             provider_payload    = EXCLUDED.provider_payload, \
             fetched_at          = EXCLUDED.fetched_at, \
             updated_at          = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&platforms)
    .bind(&external_ids)
    .bind(&usernames)
    .bind(&display_names)
    .bind(&profile_image_urls)
    .bind(&followers)
    .bind(&followings)
    .bind(&posts)
    .bind(&engagement_rates)
    .bind(&avg_likes)
    .bind(&avg_views)
    .bind(&is_verifieds)
    .bind(&has_contacts)
    .bind(&audience_countries)
    .bind(&audience_cities)
    .bind(&biographies)
    .bind(&external_urls)
    .bind(&categories)
    .bind(&payloads)
    .bind(&fetched_ats)
    .fetch_all(pool)
    .await?;

    let new_count = rows.iter().filter(|&&is_new| is_new).count() as u64;
    let updated_count = rows.len() as u64 - new_count;

    Ok((new_count, updated_count))
}
