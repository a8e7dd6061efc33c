//! Remote-provider seam for the search orchestrator.

use std::future::Future;

use creatordb_core::{Creator, Platform, SearchFilters};
use creatordb_modash::ModashClient;

use crate::error::ProviderError;

/// Remote discovery provider behind the orchestrator.
///
/// Implementations normalize their responses into the canonical [`Creator`]
/// shape; the orchestrator never sees provider field names.
pub trait CreatorProvider: Send + Sync {
    /// Stable provider key, used for cooldown persistence and logging.
    fn name(&self) -> &'static str;

    /// Filter-based discovery search.
    fn discovery_search(
        &self,
        platform: Platform,
        filters: &SearchFilters,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Creator>, ProviderError>> + Send;

    /// Free-text creator search.
    fn text_search(
        &self,
        platform: Platform,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Creator>, ProviderError>> + Send;

    /// Exact-handle profile lookup. `Ok(None)` is a miss, not an error.
    fn profile_lookup(
        &self,
        platform: Platform,
        handle: &str,
    ) -> impl Future<Output = Result<Option<Creator>, ProviderError>> + Send;
}

impl CreatorProvider for ModashClient {
    fn name(&self) -> &'static str {
        creatordb_modash::PROVIDER_NAME
    }

    async fn discovery_search(
        &self,
        platform: Platform,
        filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<Creator>, ProviderError> {
        ModashClient::discovery_search(self, platform, filters, limit, 0)
            .await
            .map_err(Into::into)
    }

    async fn text_search(
        &self,
        platform: Platform,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Creator>, ProviderError> {
        ModashClient::text_search(self, platform, query, limit)
            .await
            .map_err(Into::into)
    }

    async fn profile_lookup(
        &self,
        platform: Platform,
        handle: &str,
    ) -> Result<Option<Creator>, ProviderError> {
        ModashClient::profile_report(self, platform, handle)
            .await
            .map_err(Into::into)
    }
}
