//! Storage seam for the search orchestrator.

use std::future::Future;

use sqlx::PgPool;

use creatordb_core::{Creator, Platform, SearchFilters};
use creatordb_db::CreatorSearchPage;

use crate::error::StoreError;

/// Local creator store consulted before (and written back after) remote calls.
pub trait CreatorStore: Send + Sync {
    /// One page of creators ordered by follower count descending, plus the
    /// exact total for the same predicate.
    fn search(
        &self,
        platform: Platform,
        query: Option<&str>,
        filters: &SearchFilters,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<CreatorSearchPage, StoreError>> + Send;

    /// Inserts or refreshes creators keyed by `(platform, external_id)`.
    /// Returns `(inserted, updated)` counts.
    fn upsert_all(
        &self,
        creators: &[Creator],
    ) -> impl Future<Output = Result<(u64, u64), StoreError>> + Send;
}

/// Postgres-backed [`CreatorStore`] over the shared connection pool.
#[derive(Clone)]
pub struct PgCreatorStore {
    pool: PgPool,
}

impl PgCreatorStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CreatorStore for PgCreatorStore {
    async fn search(
        &self,
        platform: Platform,
        query: Option<&str>,
        filters: &SearchFilters,
        limit: i64,
        offset: i64,
    ) -> Result<CreatorSearchPage, StoreError> {
        creatordb_db::search_creators(&self.pool, platform, query, filters, limit, offset)
            .await
            .map_err(Into::into)
    }

    async fn upsert_all(&self, creators: &[Creator]) -> Result<(u64, u64), StoreError> {
        creatordb_db::upsert_creators(&self.pool, creators)
            .await
            .map_err(Into::into)
    }
}
