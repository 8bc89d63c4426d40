//! Fetching media records for a category.
//!
//! [`MediaSource`] is the seam the run depends on; [`AniListFetcher`] is the
//! real implementation, paging through AniList with an optional cache.

use crate::api::{AniListClient, MediaItem, MediaPage, MediaPageVariables};
use crate::cache::CacheManager;
use crate::category::CategoryFilter;
use crate::error::{Error, Result};
use async_trait::async_trait;
use shared::{MediaRecord, MediaStatus, MediaType, PagingConfig, RankingCriterion};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Anything that can produce the unranked records of a category
#[async_trait]
pub trait MediaSource: Send {
    /// Fetch every record matching `filter`, at most `paging.max_pages` pages.
    ///
    /// `criterion` picks the server-side sort, so the pages fetched hold the
    /// top of the ranking.
    async fn fetch(
        &mut self,
        filter: &CategoryFilter,
        criterion: &RankingCriterion,
        paging: PagingConfig,
    ) -> Result<Vec<MediaRecord>>;
}

/// AniList-backed media source
pub struct AniListFetcher {
    client: AniListClient,
    cache: CacheManager,
}

impl AniListFetcher {
    pub fn new(client: AniListClient, cache: CacheManager) -> Self {
        Self { client, cache }
    }

    async fn fetch_page(&mut self, variables: &MediaPageVariables) -> Result<MediaPage> {
        let cache_key = variables.cache_key();

        match self.cache.get::<MediaPage>(&cache_key) {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(key = %cache_key, error = %e, "Ignoring unreadable cache entry"),
        }

        let page = self.client.fetch_media_page(variables).await?;

        if let Err(e) = self.cache.set(&cache_key, &page) {
            warn!(key = %cache_key, error = %e, "Failed to cache page");
        }

        Ok(page)
    }
}

#[async_trait]
impl MediaSource for AniListFetcher {
    async fn fetch(
        &mut self,
        filter: &CategoryFilter,
        criterion: &RankingCriterion,
        paging: PagingConfig,
    ) -> Result<Vec<MediaRecord>> {
        info!(
            filter = %filter,
            sort = criterion.api_sort(),
            max_pages = paging.max_pages,
            "Fetching media"
        );

        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for page in 1..=paging.max_pages {
            let variables = MediaPageVariables::new(filter, criterion, page, paging.per_page);
            let media_page = self.fetch_page(&variables).await?;
            let has_next = media_page.has_next_page();

            debug!(page = page, items = media_page.media.len(), has_next = has_next, "Fetched page");

            for item in media_page.media {
                if !seen.insert(item.id) {
                    debug!(id = item.id, "Skipping duplicate media");
                    continue;
                }
                records.push(to_record(item, filter)?);
            }

            if !has_next {
                break;
            }
        }

        info!(
            records = records.len(),
            requests_last_minute = self.client.rate_limit_stats(),
            "Fetched media"
        );
        Ok(records)
    }
}

/// Convert an AniList item into a record
pub fn to_record(item: MediaItem, filter: &CategoryFilter) -> Result<MediaRecord> {
    let title = item.display_title();
    let country = item
        .country_of_origin
        .as_deref()
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty());

    let api_type = item.media_type.as_deref().unwrap_or(filter.media_type.api_type());
    let media_type = MediaType::classify(api_type, country.as_deref()).ok_or_else(|| {
        Error::MalformedResponse(format!("media {} has unknown type {:?}", item.id, api_type))
    })?;

    let status = match item.status.as_deref() {
        None => None,
        Some(s) => match s.parse::<MediaStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                warn!(id = item.id, status = s, "Unknown media status, leaving it empty");
                None
            }
        },
    };

    Ok(MediaRecord {
        id: item.id,
        title,
        media_type,
        status,
        country,
        genres: item.genres.unwrap_or_default().into_iter().collect(),
        score: item.average_score,
        popularity: item.popularity,
    })
}
