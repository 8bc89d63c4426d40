//! Data models for the project.
//!
//! This module defines the media records fetched from AniList and the
//! ranking structures built from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Normalize a user or API spelling (`not-yet released`, `NOT_YET_RELEASED`)
/// into the AniList enum form.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Media type of a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Anime,
    Manga,
    /// Korean manga; AniList stores these as `MANGA` with country `KR`
    Manhwa,
}

impl MediaType {
    /// Spelling used in exported files
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Anime => "ANIME",
            MediaType::Manga => "MANGA",
            MediaType::Manhwa => "MANHWA",
        }
    }

    /// The `MediaType` enum value AniList understands
    pub fn api_type(&self) -> &'static str {
        match self {
            MediaType::Anime => "ANIME",
            MediaType::Manga | MediaType::Manhwa => "MANGA",
        }
    }

    /// Classify an AniList record by its API type and country of origin
    pub fn classify(api_type: &str, country: Option<&str>) -> Option<Self> {
        match normalize(api_type).as_str() {
            "ANIME" => Some(MediaType::Anime),
            "MANGA" if country == Some("KR") => Some(MediaType::Manhwa),
            "MANGA" => Some(MediaType::Manga),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "ANIME" => Ok(MediaType::Anime),
            "MANGA" => Ok(MediaType::Manga),
            "MANHWA" => Ok(MediaType::Manhwa),
            _ => Err(anyhow::anyhow!("Invalid media type: {}", s)),
        }
    }
}

/// Release status of a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Finished,
    Releasing,
    NotYetReleased,
    Cancelled,
    Hiatus,
}

impl MediaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStatus::Finished => "FINISHED",
            MediaStatus::Releasing => "RELEASING",
            MediaStatus::NotYetReleased => "NOT_YET_RELEASED",
            MediaStatus::Cancelled => "CANCELLED",
            MediaStatus::Hiatus => "HIATUS",
        }
    }
}

impl std::fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "FINISHED" => Ok(MediaStatus::Finished),
            "RELEASING" => Ok(MediaStatus::Releasing),
            "NOT_YET_RELEASED" => Ok(MediaStatus::NotYetReleased),
            "CANCELLED" => Ok(MediaStatus::Cancelled),
            "HIATUS" => Ok(MediaStatus::Hiatus),
            _ => Err(anyhow::anyhow!("Invalid media status: {}", s)),
        }
    }
}

/// One media entity as returned by AniList
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRecord {
    pub id: u32,
    pub title: String,
    pub media_type: MediaType,
    pub status: Option<MediaStatus>,
    pub country: Option<String>,
    pub genres: BTreeSet<String>,
    /// AniList average score (0-100)
    pub score: Option<u32>,
    pub popularity: Option<u32>,
}

/// Attribute a ranking orders by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RankKey {
    Score,
    Popularity,
}

impl RankKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankKey::Score => "score",
            RankKey::Popularity => "popularity",
        }
    }
}

impl std::fmt::Display for RankKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RankKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "SCORE" | "AVERAGE_SCORE" => Ok(RankKey::Score),
            "POPULARITY" => Ok(RankKey::Popularity),
            _ => Err(anyhow::anyhow!("Invalid ranking key: {}", s)),
        }
    }
}

/// Sort direction of a ranking
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Descending => write!(f, "descending"),
            SortDirection::Ascending => write!(f, "ascending"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "DESC" | "DESCENDING" => Ok(SortDirection::Descending),
            "ASC" | "ASCENDING" => Ok(SortDirection::Ascending),
            _ => Err(anyhow::anyhow!("Invalid sort direction: {}", s)),
        }
    }
}

/// Which attribute orders a ranking, and in which direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RankingCriterion {
    pub key: RankKey,
    pub direction: SortDirection,
}

impl RankingCriterion {
    pub fn new(key: RankKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Descending ranking on `key`
    pub fn descending(key: RankKey) -> Self {
        Self::new(key, SortDirection::Descending)
    }

    /// Default criterion for a status filter.
    ///
    /// Unreleased media carry no score yet, so they rank by popularity.
    pub fn default_for(status: Option<MediaStatus>) -> Self {
        match status {
            Some(MediaStatus::NotYetReleased) => Self::descending(RankKey::Popularity),
            _ => Self::descending(RankKey::Score),
        }
    }

    /// Value of the ranked attribute for a record
    pub fn value_of(&self, record: &MediaRecord) -> Option<u32> {
        match self.key {
            RankKey::Score => record.score,
            RankKey::Popularity => record.popularity,
        }
    }

    /// AniList `MediaSort` value matching this criterion
    pub fn api_sort(&self) -> &'static str {
        match (self.key, self.direction) {
            (RankKey::Score, SortDirection::Descending) => "SCORE_DESC",
            (RankKey::Score, SortDirection::Ascending) => "SCORE",
            (RankKey::Popularity, SortDirection::Descending) => "POPULARITY_DESC",
            (RankKey::Popularity, SortDirection::Ascending) => "POPULARITY",
        }
    }
}

impl std::fmt::Display for RankingCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.key, self.direction)
    }
}

/// A record with its 1-based position in a ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: u32,
    pub record: MediaRecord,
}

/// Ordered records for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedList {
    pub category: String,
    pub criterion: RankingCriterion,
    pub entries: Vec<RankedEntry>,
}

impl RankedList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record ids in rank order
    pub fn ids(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.record.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, score: Option<u32>, popularity: Option<u32>) -> MediaRecord {
        MediaRecord {
            id,
            title: format!("Title {}", id),
            media_type: MediaType::Anime,
            status: None,
            country: None,
            genres: BTreeSet::new(),
            score,
            popularity,
        }
    }

    #[test]
    fn test_media_type_parsing() {
        assert_eq!("anime".parse::<MediaType>().unwrap(), MediaType::Anime);
        assert_eq!("Manhwa".parse::<MediaType>().unwrap(), MediaType::Manhwa);
        assert!("novel".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_media_type_classify() {
        assert_eq!(MediaType::classify("MANGA", Some("KR")), Some(MediaType::Manhwa));
        assert_eq!(MediaType::classify("MANGA", Some("JP")), Some(MediaType::Manga));
        assert_eq!(MediaType::classify("ANIME", Some("KR")), Some(MediaType::Anime));
        assert_eq!(MediaType::classify("MUSIC", None), None);
    }

    #[test]
    fn test_media_status_spellings() {
        for s in ["not_yet_released", "NOT_YET_RELEASED", "not-yet released"] {
            assert_eq!(s.parse::<MediaStatus>().unwrap(), MediaStatus::NotYetReleased);
        }
        assert!("airing".parse::<MediaStatus>().is_err());
        assert_eq!(MediaStatus::Hiatus.to_string(), "HIATUS");
    }

    #[test]
    fn test_default_criterion() {
        assert_eq!(
            RankingCriterion::default_for(Some(MediaStatus::NotYetReleased)).key,
            RankKey::Popularity
        );
        assert_eq!(
            RankingCriterion::default_for(Some(MediaStatus::Releasing)).key,
            RankKey::Score
        );
        assert_eq!(RankingCriterion::default_for(None).direction, SortDirection::Descending);
    }

    #[test]
    fn test_criterion_value_and_sort() {
        let r = record(1, Some(80), None);
        let by_score = RankingCriterion::descending(RankKey::Score);
        let by_pop = RankingCriterion::new(RankKey::Popularity, SortDirection::Ascending);

        assert_eq!(by_score.value_of(&r), Some(80));
        assert_eq!(by_pop.value_of(&r), None);
        assert_eq!(by_score.api_sort(), "SCORE_DESC");
        assert_eq!(by_pop.api_sort(), "POPULARITY");
    }
}
