//! Configuration management for al-ranked.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings. The defaults reproduce the nine
//! ranking categories the tool has always exported.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use crate::paths::OutputPaths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// AniList caps `perPage` at 50
pub const MAX_PER_PAGE: u32 = 50;

/// Slowest accepted request rate: one request per hour
pub const MIN_REQUESTS_PER_SECOND: f64 = 1.0 / 3600.0;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// AniList API settings
    pub api: ApiConfig,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Ranking categories, one CSV file each
    pub categories: Vec<CategoryConfig>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory the CSV files are written to
    pub dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log directory path (relative to the output directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// AniList API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// GraphQL endpoint
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Maximum retries for rate-limited or failed requests
    pub max_retries: u32,

    /// Base retry delay in milliseconds (doubled per attempt)
    pub retry_delay_ms: u64,

    /// Upper bound for a single retry delay in milliseconds
    pub max_retry_delay_ms: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,

    /// Paging settings
    pub paging: PagingConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: f64,

    /// Maximum requests per minute
    pub requests_per_minute: u32,
}

/// Paging configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PagingConfig {
    /// Records requested per page (1..=50)
    pub per_page: u32,

    /// Pages fetched per category
    pub max_pages: u32,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Enable caching of API responses
    pub enabled: bool,

    /// Cache directory (relative to the output directory or absolute)
    pub cache_dir: String,

    /// Cache expiration in seconds (None = permanent)
    pub expiration_seconds: Option<u64>,
}

/// One ranking category as written in the config file.
///
/// Values stay strings here; they are checked against the AniList
/// enumerations when the category is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    /// Category name, also the CSV file stem
    pub name: String,

    /// anime, manga or manhwa
    pub media_type: String,

    /// finished, releasing, not_yet_released, cancelled or hiatus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// ISO 3166-1 alpha-2 country of origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Genre name as AniList spells it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    /// score or popularity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_by: Option<String>,

    /// descending (default) or ascending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl CategoryConfig {
    /// Category with only a media type filter
    pub fn new(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            status: None,
            country: None,
            genre: None,
            rank_by: None,
            direction: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_rank_by(mut self, rank_by: impl Into<String>) -> Self {
        self.rank_by = Some(rank_by.into());
        self
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graphql.anilist.co".to_string(),
            timeout_seconds: 10,
            max_retries: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 60_000,
            user_agent: concat!("al-ranked/", env!("CARGO_PKG_VERSION")).to_string(),
            rate_limit: RateLimitConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // AniList allows 90 requests/minute, currently degraded to 30
        Self {
            requests_per_second: 0.5,
            requests_per_minute: 30,
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            max_pages: 2,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_dir: "cache".to_string(),
            expiration_seconds: Some(3600),
        }
    }
}

/// The categories exported when no config file lists any
pub fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("All Anime", "anime"),
        CategoryConfig::new("All Manga", "manga"),
        CategoryConfig::new("Releasing Anime", "anime").with_status("releasing"),
        CategoryConfig::new("Unreleased Anime", "anime").with_status("not_yet_released"),
        CategoryConfig::new("Releasing Manga", "manga").with_status("releasing"),
        CategoryConfig::new("Unreleased Manga", "manga").with_status("not_yet_released"),
        CategoryConfig::new("All Manhwa", "manhwa"),
        CategoryConfig::new("All Hentai", "anime").with_genre("Hentai"),
        CategoryConfig::new("All Hentai Manga", "manga").with_genre("Hentai"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            categories = config.categories.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Check the settings that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let paging = &self.api.paging;
        if paging.per_page == 0 || paging.per_page > MAX_PER_PAGE {
            bail!(
                "api.paging.per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE,
                paging.per_page
            );
        }
        if paging.max_pages == 0 {
            bail!("api.paging.max_pages must be at least 1");
        }

        let rate = &self.api.rate_limit;
        if rate.requests_per_second.is_nan() || rate.requests_per_second < MIN_REQUESTS_PER_SECOND {
            bail!(
                "api.rate_limit.requests_per_second must be at least {} (one per hour), got {}",
                MIN_REQUESTS_PER_SECOND,
                rate.requests_per_second
            );
        }
        if rate.requests_per_minute == 0 {
            bail!("api.rate_limit.requests_per_minute must be at least 1");
        }

        // Names that map to the same CSV file would overwrite each other,
        // including on case-insensitive filesystems
        let mut files: HashMap<String, &str> = HashMap::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                bail!("Category names must not be empty");
            }
            let file = OutputPaths::file_stem(&category.name).to_lowercase();
            if let Some(previous) = files.insert(file, category.name.as_str()) {
                bail!(
                    "Duplicate category name: {:?} and {:?} write the same file",
                    previous,
                    category.name
                );
            }
        }

        Ok(())
    }

    /// Keep only the named categories, in config order
    pub fn select_categories(&self, names: &[String]) -> Result<Vec<CategoryConfig>> {
        if names.is_empty() {
            return Ok(self.categories.clone());
        }

        for name in names {
            if !self.categories.iter().any(|c| &c.name == name) {
                bail!("Unknown category: {}", name);
            }
        }

        Ok(self
            .categories
            .iter()
            .filter(|c| names.contains(&c.name))
            .cloned()
            .collect())
    }

    /// Get the output directory
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the absolute path for the cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.resolve(&self.cache.cache_dir)
    }

    fn resolve(&self, dir: &str) -> PathBuf {
        let path = Path::new(dir);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.dir, ".");
        assert_eq!(config.api.base_url, "https://graphql.anilist.co");
        assert_eq!(config.api.paging.per_page, 50);
        assert_eq!(config.api.paging.max_pages, 2);
        assert_eq!(config.categories.len(), 9);
        assert!(!config.cache.enabled);
        config.validate().unwrap();
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let original_config = Config::default();
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.output.dir, original_config.output.dir);
        assert_eq!(loaded_config.api.base_url, original_config.api.base_url);
        assert_eq!(loaded_config.categories, original_config.categories);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.categories.len(), 9);
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let config = Config::from_toml(
            r#"
            [output]
            dir = "rankings"

            [[categories]]
            name = "Top Manhwa"
            media_type = "manhwa"
            rank_by = "popularity"
            "#,
        )?;

        assert_eq!(config.output.dir, "rankings");
        assert_eq!(config.api.max_retries, 3);
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].rank_by.as_deref(), Some("popularity"));
        assert_eq!(config.categories[0].status, None);
        Ok(())
    }

    #[test]
    fn test_unknown_category_field_rejected() {
        let result = Config::from_toml(
            r#"
            [[categories]]
            name = "All Anime"
            media_type = "anime"
            sort = "score"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let mut config = Config::default();
        config.categories.push(CategoryConfig::new("All Anime", "anime"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate category"));
    }

    #[test]
    fn test_categories_sharing_a_file_rejected() {
        for (first, second) in [("Top", "Top "), ("A/B", "A_B"), ("Top Manga", "top manga")] {
            let mut config = Config::default();
            config.categories = vec![
                CategoryConfig::new(first, "anime"),
                CategoryConfig::new(second, "manga"),
            ];
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("same file"), "{} / {}", first, second);
        }
    }

    #[test]
    fn test_rate_limit_bounds() {
        let mut config = Config::default();
        for rate in [0.0, -1.0, f64::NAN, 1e-30] {
            config.api.rate_limit.requests_per_second = rate;
            assert!(config.validate().is_err(), "rate {} accepted", rate);
        }

        config.api.rate_limit.requests_per_second = MIN_REQUESTS_PER_SECOND;
        assert!(config.validate().is_ok());

        config.api.rate_limit.requests_per_minute = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_paging_bounds() {
        let mut config = Config::default();
        config.api.paging.per_page = 51;
        assert!(config.validate().is_err());

        config.api.paging.per_page = 10;
        config.api.paging.max_pages = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_categories() -> Result<()> {
        let config = Config::default();

        let all = config.select_categories(&[])?;
        assert_eq!(all.len(), 9);

        let picked = config.select_categories(&["All Manga".to_string(), "All Anime".to_string()])?;
        let names: Vec<_> = picked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["All Anime", "All Manga"]);

        assert!(config.select_categories(&["Nope".to_string()]).is_err());
        Ok(())
    }

    #[test]
    fn test_path_resolution() {
        let mut config = Config::default();
        config.output.dir = "out".to_string();

        assert!(config.log_dir().ends_with("out/logs"));
        assert!(config.cache_dir().ends_with("out/cache"));

        config.cache.cache_dir = "/tmp/al-ranked-cache".to_string();
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/al-ranked-cache"));
    }
}
