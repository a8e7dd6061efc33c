//! HTTP client for the Modash creator-discovery REST API.
//!
//! Exposes three capabilities: filter-based discovery search, free-text
//! creator search, and direct profile reports for exact-handle lookups.
//! Every response is normalized into the canonical [`creatordb_core::Creator`]
//! shape at this boundary; callers never see provider field names, and
//! rate-limit responses surface as the typed [`ModashError::RateLimited`].

mod client;
mod error;
mod normalize;
mod types;

pub use client::{ModashClient, PROVIDER_NAME};
pub use error::ModashError;
pub use normalize::{normalize_creator, normalize_engagement_rate};
