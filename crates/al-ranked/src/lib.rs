//! AniList ranking exporter.
//!
//! This library fetches media from the AniList GraphQL API, ranks it per
//! configured category and writes each ranking to a CSV file.

pub mod api;
pub mod cache;
pub mod category;
pub mod error;
pub mod exporter;
pub mod fetcher;
pub mod ranker;
pub mod runner;

pub use api::{AniListClient, RateLimiter};
pub use cache::CacheManager;
pub use category::{Category, CategoryFilter};
pub use error::{Error, Result};
pub use fetcher::{AniListFetcher, MediaSource};
pub use runner::{
    CategoryOutcome, ExportSummary, RankingRunner, RunContext, RunReport, EXIT_CATEGORY_FAILED,
    EXIT_STARTUP_FAILED, EXIT_SUCCESS,
};
