//! The AniList `Page.media` query.
//!
//! Filters travel as GraphQL variables; a null or absent variable leaves that
//! argument unconstrained on AniList's side.

use crate::category::CategoryFilter;
use serde::Serialize;
use shared::RankingCriterion;

pub const MEDIA_PAGE_QUERY: &str = r#"
query ($page: Int, $perPage: Int, $type: MediaType, $status: MediaStatus, $countryOfOrigin: CountryCode, $genre: String, $sort: [MediaSort]) {
  Page(page: $page, perPage: $perPage) {
    pageInfo {
      currentPage
      hasNextPage
    }
    media(type: $type, status: $status, countryOfOrigin: $countryOfOrigin, genre: $genre, sort: $sort) {
      id
      title {
        romaji
        english
      }
      type
      status
      countryOfOrigin
      genres
      averageScore
      popularity
    }
  }
}
"#;

/// Variables of [`MEDIA_PAGE_QUERY`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPageVariables {
    pub page: u32,
    pub per_page: u32,
    #[serde(rename = "type")]
    pub media_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_of_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub sort: Vec<&'static str>,
}

impl MediaPageVariables {
    pub fn new(filter: &CategoryFilter, criterion: &RankingCriterion, page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            media_type: filter.media_type.api_type(),
            status: filter.status.map(|s| s.as_str()),
            country_of_origin: filter.api_country().map(str::to_string),
            genre: filter.genre.clone(),
            // Secondary sort keeps AniList's paging stable across equal scores
            sort: vec![criterion.api_sort(), "ID"],
        }
    }

    /// Stable key identifying this request, for the response cache
    pub fn cache_key(&self) -> String {
        let mut key = format!("{}_{}", self.media_type, self.sort.first().copied().unwrap_or_default());
        if let Some(status) = self.status {
            key.push_str(&format!("_status-{}", status));
        }
        if let Some(country) = &self.country_of_origin {
            key.push_str(&format!("_country-{}", country));
        }
        if let Some(genre) = &self.genre {
            key.push_str(&format!("_genre-{}", shared::OutputPaths::slug(genre)));
        }
        key.push_str(&format!("_per{}_page{}", self.per_page, self.page));
        key.to_lowercase()
    }
}
