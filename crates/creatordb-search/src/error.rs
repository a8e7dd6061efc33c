use thiserror::Error;

use creatordb_db::DbError;
use creatordb_modash::ModashError;

/// Errors surfaced through the [`crate::CreatorStore`] seam.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// Backend-agnostic failure, used by non-Postgres store implementations.
    #[error("{0}")]
    Backend(String),
}

/// Errors surfaced through the [`crate::CreatorProvider`] seam.
///
/// The orchestrator only branches on `RateLimited` and `NotFound`; everything
/// else is reported as a message in the outcome envelope.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("profile not found")]
    NotFound,

    #[error("provider error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),
}

impl From<ModashError> for ProviderError {
    fn from(err: ModashError) -> Self {
        match err {
            ModashError::RateLimited { retry_after_secs } => {
                ProviderError::RateLimited { retry_after_secs }
            }
            ModashError::NotFound { .. } => ProviderError::NotFound,
            ModashError::Http(e) => ProviderError::Network(e.to_string()),
            other => ProviderError::Api(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modash_rate_limit_maps_with_retry_hint() {
        let err: ProviderError = ModashError::RateLimited {
            retry_after_secs: Some(30),
        }
        .into();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: Some(30)
            }
        ));
    }

    #[test]
    fn modash_api_error_maps_to_api() {
        let err: ProviderError = ModashError::ApiError("insufficient credits".to_string()).into();
        assert!(matches!(err, ProviderError::Api(ref m) if m.contains("insufficient credits")));
    }
}
