//! Search filter set and the result envelope returned by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::creator::Creator;

/// Optional constraints for a creator search. Absent fields are unconstrained;
/// range bounds are inclusive on both ends.
///
/// `engagement_min`/`engagement_max` are fractions in `[0, 1]`, matching the
/// canonical unit of [`Creator::engagement_rate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub followers_min: Option<i64>,
    pub followers_max: Option<i64>,
    pub engagement_min: Option<f64>,
    pub engagement_max: Option<f64>,
    pub verified: Option<bool>,
    pub has_contact_details: Option<bool>,
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    pub location: Option<String>,
}

impl SearchFilters {
    /// A filter set scoped to a single hashtag, used by the `#tag` search route.
    #[must_use]
    pub fn for_hashtag(tag: impl Into<String>) -> Self {
        Self {
            hashtags: vec![tag.into()],
            ..Self::default()
        }
    }
}

/// Where the creators in a [`SearchOutcome`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Served from the local store.
    Database,
    /// Fetched from the remote provider (and written back to the store).
    Remote,
    /// The remote call was skipped or rejected due to a provider cooldown.
    RateLimited,
    /// Both local and remote paths failed; see `error`.
    Error,
}

/// The envelope every orchestrated search resolves to.
///
/// Errors are carried in-band: an envelope with `error: Some(..)` and an
/// empty creator list is distinct from a successful empty result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub creators: Vec<Creator>,
    pub total: i64,
    pub provenance: Provenance,
    pub error: Option<String>,
}

impl SearchOutcome {
    #[must_use]
    pub fn empty(provenance: Provenance) -> Self {
        Self {
            creators: Vec::new(),
            total: 0,
            provenance,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            creators: Vec::new(),
            total: 0,
            provenance: Provenance::Error,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_are_unconstrained() {
        let f = SearchFilters::default();
        assert!(f.followers_min.is_none());
        assert!(f.followers_max.is_none());
        assert!(f.verified.is_none());
        assert!(f.hashtags.is_empty());
    }

    #[test]
    fn hashtag_filters_scope_to_single_tag() {
        let f = SearchFilters::for_hashtag("fitness");
        assert_eq!(f.hashtags, vec!["fitness".to_string()]);
        assert!(f.keyword.is_none());
    }

    #[test]
    fn provenance_serializes_snake_case() {
        let json = serde_json::to_string(&Provenance::RateLimited).expect("serialize");
        assert_eq!(json, "\"rate_limited\"");
    }

    #[test]
    fn failed_outcome_is_distinguishable_from_empty() {
        let empty = SearchOutcome::empty(Provenance::Database);
        let failed = SearchOutcome::failed("boom");
        assert!(empty.error.is_none());
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert_eq!(failed.provenance, Provenance::Error);
        assert_ne!(empty, failed);
    }
}
