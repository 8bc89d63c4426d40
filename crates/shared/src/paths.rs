//! File path utilities for output files.
//!
//! Centralizes where ranking CSVs land and how category names become file
//! names and cache keys.

use std::path::{Path, PathBuf};

/// File path manager for exported rankings
#[derive(Debug, Clone)]
pub struct OutputPaths {
    root: PathBuf,
}

impl OutputPaths {
    /// Create a new OutputPaths with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// CSV file for a category.
    ///
    /// The category name is kept as-is ("All Anime" -> "All Anime.csv");
    /// only characters that would escape the directory or are invalid in
    /// file names are replaced.
    pub fn csv_file(&self, category: &str) -> PathBuf {
        self.root.join(format!("{}.csv", Self::file_stem(category)))
    }

    /// Create the output directory
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// File-name-safe version of a category name
    pub fn file_stem(name: &str) -> String {
        let stem: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        match stem.as_str() {
            "" | "." | ".." => "_".to_string(),
            _ => stem,
        }
    }

    /// Lowercase underscore slug (for cache keys)
    pub fn slug(name: &str) -> String {
        name.chars()
            .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '_')
            .collect::<String>()
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_file() {
        let paths = OutputPaths::new("/data");

        assert_eq!(
            paths.csv_file("All Anime"),
            PathBuf::from("/data/All Anime.csv")
        );
        assert_eq!(
            paths.csv_file("Anime/Manga: Top"),
            PathBuf::from("/data/Anime_Manga_ Top.csv")
        );
    }

    #[test]
    fn test_file_stem_cannot_escape() {
        assert_eq!(OutputPaths::file_stem(".."), "_");
        assert_eq!(OutputPaths::file_stem("  "), "_");
        assert_eq!(OutputPaths::file_stem("../etc"), ".._etc");
    }

    #[test]
    fn test_slug() {
        assert_eq!(OutputPaths::slug("Unreleased Anime"), "unreleased_anime");
        assert_eq!(OutputPaths::slug("NOT_YET_RELEASED"), "not_yet_released");
        assert_eq!(OutputPaths::slug("Slice of Life!"), "slice_of_life");
    }

    #[test]
    fn test_create_dirs() -> std::io::Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let paths = OutputPaths::new(temp_dir.path().join("nested/out"));
        paths.create_dirs()?;
        assert!(paths.root().is_dir());
        Ok(())
    }
}
