//! Rate-limit sentinel: remembers provider cooldowns across requests (and,
//! with the Postgres store, across restarts).

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::error::StoreError;

/// Persistence seam for provider cooldown timestamps.
pub trait CooldownStore: Send + Sync {
    fn get_until(
        &self,
        provider: &str,
    ) -> impl Future<Output = Result<Option<DateTime<Utc>>, StoreError>> + Send;

    fn set_until(
        &self,
        provider: &str,
        until: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Postgres-backed [`CooldownStore`] over the `provider_cooldowns` table.
#[derive(Clone)]
pub struct PgCooldownStore {
    pool: PgPool,
}

impl PgCooldownStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CooldownStore for PgCooldownStore {
    async fn get_until(&self, provider: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        creatordb_db::get_cooldown(&self.pool, provider)
            .await
            .map_err(Into::into)
    }

    async fn set_until(&self, provider: &str, until: DateTime<Utc>) -> Result<(), StoreError> {
        creatordb_db::set_cooldown(&self.pool, provider, until)
            .await
            .map_err(Into::into)
    }
}

/// Tracks whether a provider is inside a rate-limit cooldown window.
///
/// The sentinel is advisory: read failures are logged and treated as "not
/// cooling", and write failures only cost an extra remote attempt later.
pub struct RateLimitSentinel<C> {
    store: C,
    provider: &'static str,
    default_cooldown_secs: u64,
}

impl<C: CooldownStore> RateLimitSentinel<C> {
    pub fn new(store: C, provider: &'static str, default_cooldown_secs: u64) -> Self {
        Self {
            store,
            provider,
            default_cooldown_secs,
        }
    }

    /// Returns true while the provider's persisted cooldown lies in the
    /// future. Expired or missing rows mean "not cooling".
    pub async fn is_cooling(&self) -> bool {
        match self.store.get_until(self.provider).await {
            Ok(Some(until)) => Utc::now() < until,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(provider = self.provider, error = %e, "cooldown read failed, assuming not cooling");
                false
            }
        }
    }

    /// Starts a cooldown window from now, honoring the provider's
    /// `Retry-After` hint when present.
    pub async fn trip(&self, retry_after_secs: Option<u64>) {
        let secs = retry_after_secs.unwrap_or(self.default_cooldown_secs);
        let secs = i64::try_from(secs).unwrap_or(i64::MAX);
        let until = Utc::now() + Duration::seconds(secs);
        tracing::warn!(provider = self.provider, cooldown_secs = secs, "provider rate limited, entering cooldown");
        if let Err(e) = self.store.set_until(self.provider, until).await {
            tracing::warn!(provider = self.provider, error = %e, "failed to persist cooldown");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct MemoryCooldowns {
        rows: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
        fail_reads: bool,
    }

    impl CooldownStore for MemoryCooldowns {
        async fn get_until(&self, provider: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Backend("read failed".to_string()));
            }
            Ok(self.rows.lock().expect("lock").get(provider).copied())
        }

        async fn set_until(&self, provider: &str, until: DateTime<Utc>) -> Result<(), StoreError> {
            self.rows
                .lock()
                .expect("lock")
                .insert(provider.to_string(), until);
            Ok(())
        }
    }

    #[tokio::test]
    async fn fresh_sentinel_is_not_cooling() {
        let sentinel = RateLimitSentinel::new(MemoryCooldowns::default(), "modash", 60);
        assert!(!sentinel.is_cooling().await);
    }

    #[tokio::test]
    async fn trip_starts_cooldown_until_rewound() {
        let store = MemoryCooldowns::default();
        let sentinel = RateLimitSentinel::new(store.clone(), "modash", 60);

        sentinel.trip(None).await;
        assert!(sentinel.is_cooling().await);

        // Rewind the stored expiry into the past to simulate elapsed time.
        store
            .rows
            .lock()
            .expect("lock")
            .insert("modash".to_string(), Utc::now() - Duration::seconds(1));
        assert!(!sentinel.is_cooling().await);
    }

    #[tokio::test]
    async fn retry_after_hint_extends_cooldown() {
        let store = MemoryCooldowns::default();
        let sentinel = RateLimitSentinel::new(store.clone(), "modash", 60);

        sentinel.trip(Some(3600)).await;
        let until = store.rows.lock().expect("lock")["modash"];
        assert!(until > Utc::now() + Duration::seconds(3000));
    }

    #[tokio::test]
    async fn read_failure_means_not_cooling() {
        let store = MemoryCooldowns {
            fail_reads: true,
            ..MemoryCooldowns::default()
        };
        let sentinel = RateLimitSentinel::new(store, "modash", 60);
        assert!(!sentinel.is_cooling().await);
    }
}
