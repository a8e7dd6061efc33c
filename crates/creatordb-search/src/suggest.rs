//! Suggestion de-duplication and debounce.
//!
//! Typeahead traffic repeats the same query many times in quick succession.
//! This cache keys requests by `platform:normalized-query` and applies two
//! rules: a request while one is already in flight for the same key joins the
//! shared future (exactly one underlying call), and a request arriving within
//! the minimum interval of the previous issue for the same key is suppressed
//! outright.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::time::Instant;

use creatordb_core::{Platform, SearchOutcome};

/// How far back issue timestamps are retained before being swept.
const ISSUE_HORIZON: Duration = Duration::from_secs(60);

type SharedOutcome = Shared<BoxFuture<'static, SearchOutcome>>;

struct CacheInner {
    in_flight: HashMap<String, SharedOutcome>,
    last_issued: HashMap<String, Instant>,
}

/// Keystroke-level request cache for the suggestion path.
pub struct SuggestionCache {
    min_interval: Duration,
    inner: Mutex<CacheInner>,
}

impl SuggestionCache {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            inner: Mutex::new(CacheInner {
                in_flight: HashMap::new(),
                last_issued: HashMap::new(),
            }),
        }
    }

    /// Canonical cache key: platform plus the trimmed, lowercased query.
    #[must_use]
    pub fn normalize_key(platform: Platform, query: &str) -> String {
        format!("{platform}:{}", query.trim().to_lowercase())
    }

    /// Runs (or joins, or suppresses) the suggestion identified by `key`.
    ///
    /// Returns `None` when the request falls inside the debounce window and
    /// no call is in flight; callers should treat that as an empty result.
    pub async fn run<F>(&self, key: String, make: F) -> Option<SearchOutcome>
    where
        F: FnOnce() -> BoxFuture<'static, SearchOutcome>,
    {
        let shared = {
            let mut inner = self.inner.lock().await;

            if let Some(existing) = inner.in_flight.get(&key) {
                tracing::debug!(key = %key, "joining in-flight suggestion");
                existing.clone()
            } else {
                let now = Instant::now();
                let suppressed = inner
                    .last_issued
                    .get(&key)
                    .is_some_and(|prev| now.duration_since(*prev) < self.min_interval);
                if suppressed {
                    tracing::debug!(key = %key, "suggestion suppressed inside debounce window");
                    return None;
                }

                inner
                    .last_issued
                    .retain(|_, issued| now.duration_since(*issued) < ISSUE_HORIZON);
                inner.last_issued.insert(key.clone(), now);

                let fut = make().shared();
                inner.in_flight.insert(key.clone(), fut.clone());
                fut
            }
        };

        let outcome = shared.clone().await;

        // Remove the settled entry, but only if it is still ours; a newer
        // call for the same key may have replaced it already.
        let mut inner = self.inner.lock().await;
        if inner
            .in_flight
            .get(&key)
            .is_some_and(|current| current.ptr_eq(&shared))
        {
            inner.in_flight.remove(&key);
        }

        Some(outcome)
    }
}
