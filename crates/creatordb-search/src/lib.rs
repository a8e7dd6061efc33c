//! Creator-search orchestration.
//!
//! Ties the local Postgres cache, the remote discovery provider, the
//! rate-limit sentinel, and the suggestion debounce cache together behind
//! [`SearchCoordinator`]. All dependencies enter through the seam traits
//! ([`CreatorStore`], [`CreatorProvider`], [`CooldownStore`]) so the decision
//! logic is testable without a database or network.

pub mod coordinator;
pub mod error;
pub mod provider;
pub mod sentinel;
pub mod store;
pub mod suggest;

pub use coordinator::{CoordinatorConfig, SearchCoordinator, SearchRequest};
pub use error::{ProviderError, StoreError};
pub use provider::CreatorProvider;
pub use sentinel::{CooldownStore, PgCooldownStore, RateLimitSentinel};
pub use store::{CreatorStore, PgCreatorStore};
pub use suggest::SuggestionCache;
