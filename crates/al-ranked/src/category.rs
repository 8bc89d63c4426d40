//! Ranking categories.
//!
//! Turns the string-valued `[[categories]]` entries of the config file into
//! typed filters, rejecting anything AniList would not accept.

use crate::error::{Error, Result};
use shared::{CategoryConfig, MediaStatus, MediaType, RankKey, RankingCriterion, SortDirection};

/// Country AniList assigns to manhwa
pub const MANHWA_COUNTRY: &str = "KR";

/// Media filter sent to AniList
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    pub media_type: MediaType,
    pub status: Option<MediaStatus>,
    /// Upper-case ISO 3166-1 alpha-2 code
    pub country: Option<String>,
    pub genre: Option<String>,
}

impl CategoryFilter {
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            status: None,
            country: None,
            genre: None,
        }
    }

    pub fn with_status(mut self, status: MediaStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Country sent as `countryOfOrigin`; manhwa always implies `KR`
    pub fn api_country(&self) -> Option<&str> {
        match self.media_type {
            MediaType::Manhwa => Some(MANHWA_COUNTRY),
            _ => self.country.as_deref(),
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.media_type)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(country) = self.api_country() {
            write!(f, " country={}", country)?;
        }
        if let Some(genre) = &self.genre {
            write!(f, " genre={}", genre)?;
        }
        Ok(())
    }
}

/// A validated category: filter plus ranking criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub filter: CategoryFilter,
    pub criterion: RankingCriterion,
}

impl Category {
    pub fn new(name: impl Into<String>, filter: CategoryFilter, criterion: RankingCriterion) -> Self {
        Self {
            name: name.into(),
            filter,
            criterion,
        }
    }

    /// Validate a config entry
    pub fn from_config(config: &CategoryConfig) -> Result<Self> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidFilter("category name is empty".to_string()));
        }

        let invalid = |e: anyhow::Error| Error::InvalidFilter(format!("{}: {}", name, e));

        let media_type: MediaType = config.media_type.parse().map_err(invalid)?;

        let status = config
            .status
            .as_deref()
            .map(str::parse::<MediaStatus>)
            .transpose()
            .map_err(invalid)?;

        let country = config
            .country
            .as_deref()
            .map(|c| parse_country(name, c))
            .transpose()?;

        if media_type == MediaType::Manhwa {
            if let Some(c) = country.as_deref().filter(|c| *c != MANHWA_COUNTRY) {
                return Err(Error::InvalidFilter(format!(
                    "{}: manhwa is {} media, country {} conflicts",
                    name, MANHWA_COUNTRY, c
                )));
            }
        }

        let genre = match config.genre.as_deref().map(str::trim) {
            Some("") => {
                return Err(Error::InvalidFilter(format!("{}: genre is empty", name)));
            }
            other => other.map(str::to_string),
        };

        let default = RankingCriterion::default_for(status);
        let key = config
            .rank_by
            .as_deref()
            .map(str::parse::<RankKey>)
            .transpose()
            .map_err(invalid)?
            .unwrap_or(default.key);
        let direction = config
            .direction
            .as_deref()
            .map(str::parse::<SortDirection>)
            .transpose()
            .map_err(invalid)?
            .unwrap_or(default.direction);

        let filter = CategoryFilter {
            media_type,
            status,
            country,
            genre,
        };
        Ok(Self::new(name, filter, RankingCriterion::new(key, direction)))
    }
}

fn parse_country(name: &str, country: &str) -> Result<String> {
    let code = country.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(Error::InvalidFilter(format!(
            "{}: country must be a two-letter ISO code, got {:?}",
            name, country
        )))
    }
}
