//! Database operations for the `provider_cooldowns` table.
//!
//! A single row per provider records how long remote calls should be skipped
//! after a rate-limit response. Expired rows are ignored by readers and
//! overwritten by the next write.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// Returns the persisted cooldown expiry for `provider`, or `None` if the
/// provider has never been rate limited.
///
/// Callers are responsible for comparing against the current time; expired
/// timestamps are returned as-is.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_cooldown(
    pool: &PgPool,
    provider: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
    let until: Option<DateTime<Utc>> = sqlx::query_scalar(
        "SELECT cooldown_until FROM provider_cooldowns WHERE provider = $1",
    )
    .bind(provider)
    .fetch_optional(pool)
    .await?;

    Ok(until)
}

/// Records that `provider` should not be called again until `until`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn set_cooldown(
    pool: &PgPool,
    provider: &str,
    until: DateTime<Utc>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO provider_cooldowns (provider, cooldown_until) \
         VALUES ($1, $2) \
         ON CONFLICT (provider) DO UPDATE SET \
             cooldown_until = EXCLUDED.cooldown_until, \
             updated_at     = NOW()",
    )
    .bind(provider)
    .bind(until)
    .execute(pool)
    .await?;
    Ok(())
}

/// Removes the cooldown row for `provider`, if any. Used by operator tooling;
/// the orchestrator itself only ever lets cooldowns expire.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn clear_cooldown(pool: &PgPool, provider: &str) -> Result<(), DbError> {
    sqlx::query("DELETE FROM provider_cooldowns WHERE provider = $1")
        .bind(provider)
        .execute(pool)
        .await?;
    Ok(())
}
