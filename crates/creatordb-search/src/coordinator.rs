//! The search orchestrator.
//!
//! Decision order for a search request:
//! 1. No query and not forced remote: serve the local store only.
//! 2. Local first; enough local matches short-circuit the remote call.
//! 3. Otherwise go remote, subject to the rate-limit sentinel. `@handle`
//!    queries try the exact profile lookup before fuzzy text search; `#tag`
//!    queries route to hashtag-scoped discovery search.
//! 4. Remote failures degrade to local partials with an error annotation;
//!    rate limits trip the sentinel and are reported as provenance, never as
//!    errors.
//! 5. Remote successes are written back to the store before returning.

use std::cmp::min;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use creatordb_core::{AppConfig, Creator, Platform, Provenance, SearchFilters, SearchOutcome};
use creatordb_db::CreatorSearchPage;

use crate::error::ProviderError;
use crate::provider::CreatorProvider;
use crate::sentinel::{CooldownStore, RateLimitSentinel};
use crate::store::CreatorStore;
use crate::suggest::SuggestionCache;

/// One orchestrated search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub platform: Platform,
    pub query: Option<String>,
    pub filters: SearchFilters,
    pub limit: u32,
    pub offset: u32,
    /// Skip the local-sufficiency short circuit and always go remote.
    pub force_remote: bool,
}

impl SearchRequest {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            query: None,
            filters: SearchFilters::default(),
            limit: 15,
            offset: 0,
            force_remote: false,
        }
    }
}

/// Tunables for the orchestrator, loaded from [`AppConfig`] in the binaries.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Local results at or above `min(threshold, limit)` skip the remote call.
    pub sufficiency_threshold: usize,
    /// Result-page size used by the suggestion path.
    pub suggestion_limit: u32,
    /// Debounce window for repeated suggestion keys.
    pub min_suggest_interval: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            sufficiency_threshold: 5,
            suggestion_limit: 10,
            min_suggest_interval: Duration::from_millis(300),
        }
    }
}

impl CoordinatorConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            sufficiency_threshold: config.search_sufficiency_threshold,
            suggestion_limit: config.suggest_limit,
            min_suggest_interval: Duration::from_millis(config.suggest_min_interval_ms),
        }
    }
}

/// Orchestrates local-store search, remote discovery, rate-limit cooldowns,
/// and suggestion de-duplication behind one entry point.
pub struct SearchCoordinator<S, P, C> {
    store: S,
    provider: P,
    sentinel: RateLimitSentinel<C>,
    suggestions: SuggestionCache,
    config: CoordinatorConfig,
}

impl<S, P, C> SearchCoordinator<S, P, C>
where
    S: CreatorStore + 'static,
    P: CreatorProvider + 'static,
    C: CooldownStore + 'static,
{
    pub fn new(
        store: S,
        provider: P,
        sentinel: RateLimitSentinel<C>,
        config: CoordinatorConfig,
    ) -> Self {
        let suggestions = SuggestionCache::new(config.min_suggest_interval);
        Self {
            store,
            provider,
            sentinel,
            suggestions,
            config,
        }
    }

    /// Runs one search to completion. Never returns an error: failures are
    /// folded into the outcome envelope.
    pub async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let query = request
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        if query.is_none() && !request.force_remote {
            return self.local_only(request).await;
        }
        let Some(query) = query else {
            // Forced remote without a query is caller misuse; there is
            // nothing to send to the provider.
            tracing::debug!("force_remote without a query, returning empty result");
            return SearchOutcome::empty(Provenance::Database);
        };

        let local = match self
            .store
            .search(
                request.platform,
                Some(query),
                &request.filters,
                i64::from(request.limit),
                i64::from(request.offset),
            )
            .await
        {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!(error = %e, "local search failed, continuing remote-only");
                None
            }
        };

        let needed = min(self.config.sufficiency_threshold, request.limit as usize);
        if !request.force_remote {
            if let Some(page) = &local {
                if page.creators.len() >= needed {
                    tracing::debug!(
                        matches = page.creators.len(),
                        "local results sufficient, skipping remote"
                    );
                    return page_outcome(page.clone(), Provenance::Database);
                }
            }
        }

        if self.sentinel.is_cooling().await {
            tracing::debug!(provider = self.provider.name(), "provider cooling, skipping remote");
            return SearchOutcome::empty(Provenance::RateLimited);
        }

        match self.remote_search(request.platform, query, request.limit).await {
            Ok(creators) => {
                if !creators.is_empty() {
                    match self.store.upsert_all(&creators).await {
                        Ok((inserted, updated)) => {
                            tracing::debug!(inserted, updated, "remote results written back");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "write-back failed, serving remote results anyway");
                        }
                    }
                }
                let total = i64::try_from(creators.len()).unwrap_or(i64::MAX);
                SearchOutcome {
                    creators,
                    total,
                    provenance: Provenance::Remote,
                    error: None,
                }
            }
            Err(ProviderError::RateLimited { retry_after_secs }) => {
                self.sentinel.trip(retry_after_secs).await;
                match local {
                    Some(page) if !page.creators.is_empty() => {
                        page_outcome(page, Provenance::RateLimited)
                    }
                    _ => SearchOutcome::empty(Provenance::RateLimited),
                }
            }
            Err(e) => match local {
                Some(page) if !page.creators.is_empty() => {
                    tracing::warn!(error = %e, "remote search failed, serving local partials");
                    let mut outcome = page_outcome(page, Provenance::Database);
                    outcome.error = Some(format!("API failed: {e}. Showing local results."));
                    outcome
                }
                _ => {
                    tracing::error!(error = %e, "remote search failed with no local fallback");
                    SearchOutcome::failed(format!("API failed: {e}"))
                }
            },
        }
    }

    /// Debounced, de-duplicated suggestion search for typeahead traffic.
    /// Suppressed requests resolve to an empty outcome.
    pub async fn suggest(self: &Arc<Self>, platform: Platform, query: &str) -> SearchOutcome {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return SearchOutcome::empty(Provenance::Database);
        }

        let key = SuggestionCache::normalize_key(platform, trimmed);
        let this = Arc::clone(self);
        let query = trimmed.to_string();
        let limit = self.config.suggestion_limit;

        let outcome = self
            .suggestions
            .run(key, move || {
                async move {
                    let request = SearchRequest {
                        query: Some(query),
                        limit,
                        ..SearchRequest::new(platform)
                    };
                    this.search(&request).await
                }
                .boxed()
            })
            .await;

        outcome.unwrap_or_else(|| SearchOutcome::empty(Provenance::Database))
    }

    /// Exact-handle profile lookup with store write-back.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::RateLimited`] while the provider is cooling
    /// (or when the lookup itself is rate limited, tripping the sentinel),
    /// and any other provider error as-is.
    pub async fn lookup_profile(
        &self,
        platform: Platform,
        handle: &str,
    ) -> Result<Option<Creator>, ProviderError> {
        if self.sentinel.is_cooling().await {
            return Err(ProviderError::RateLimited {
                retry_after_secs: None,
            });
        }

        let handle = handle.trim().trim_start_matches('@');
        match self.provider.profile_lookup(platform, handle).await {
            Ok(Some(creator)) => {
                if let Err(e) = self.store.upsert_all(std::slice::from_ref(&creator)).await {
                    tracing::warn!(error = %e, "profile write-back failed");
                }
                Ok(Some(creator))
            }
            Ok(None) => Ok(None),
            Err(ProviderError::RateLimited { retry_after_secs }) => {
                self.sentinel.trip(retry_after_secs).await;
                Err(ProviderError::RateLimited { retry_after_secs })
            }
            Err(e) => Err(e),
        }
    }

    async fn local_only(&self, request: &SearchRequest) -> SearchOutcome {
        match self
            .store
            .search(
                request.platform,
                None,
                &request.filters,
                i64::from(request.limit),
                i64::from(request.offset),
            )
            .await
        {
            Ok(page) => page_outcome(page, Provenance::Database),
            Err(e) => {
                tracing::error!(error = %e, "local search failed");
                SearchOutcome::failed(format!("search unavailable: {e}"))
            }
        }
    }

    /// Routes the query: `@handle` tries the profile fast path first and
    /// falls back to fuzzy text search on a miss; `#tag` goes to
    /// hashtag-scoped discovery; everything else is plain text search.
    async fn remote_search(
        &self,
        platform: Platform,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Creator>, ProviderError> {
        if let Some(handle) = query.strip_prefix('@').filter(|h| !h.is_empty()) {
            match self.provider.profile_lookup(platform, handle).await {
                Ok(Some(creator)) => return Ok(vec![creator]),
                Ok(None) => {
                    tracing::debug!(handle, "profile fast path missed, trying text search");
                }
                Err(e @ ProviderError::RateLimited { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(handle, error = %e, "profile fast path failed, trying text search");
                }
            }
            return self.provider.text_search(platform, handle, limit).await;
        }

        if let Some(tag) = query.strip_prefix('#').filter(|t| !t.is_empty()) {
            let filters = SearchFilters::for_hashtag(tag);
            return self.provider.discovery_search(platform, &filters, limit).await;
        }

        self.provider.text_search(platform, query, limit).await
    }
}

fn page_outcome(page: CreatorSearchPage, provenance: Provenance) -> SearchOutcome {
    SearchOutcome {
        creators: page.creators,
        total: page.total,
        provenance,
        error: None,
    }
}
