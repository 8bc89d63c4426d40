//! AniList GraphQL API client.
//!
//! This module provides a rate-limited, retry-enabled client for the
//! `Page.media` query used to build rankings.

pub mod client;
pub mod query;
pub mod rate_limiter;
pub mod types;

pub use client::AniListClient;
pub use query::MediaPageVariables;
pub use rate_limiter::RateLimiter;
pub use types::*;
