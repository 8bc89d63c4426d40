//! CSV export of ranked lists.
//!
//! One file per category, header row first, columns in a fixed order.
//! Files are rendered in memory, written next to the target and renamed over
//! it, so a failed export never leaves a half-written ranking behind.

use crate::error::{Error, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::{RankedEntry, RankedList};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column order of every exported file
pub const COLUMNS: [&str; 9] = [
    "rank",
    "id",
    "title",
    "type",
    "status",
    "country",
    "genres",
    "score",
    "popularity",
];

/// Separator between genres inside the `genres` column
pub const GENRE_SEPARATOR: &str = ";";

/// One CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub rank: u32,
    pub id: u32,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub status: Option<String>,
    pub country: Option<String>,
    pub genres: String,
    pub score: Option<u32>,
    pub popularity: Option<u32>,
}

impl From<&RankedEntry> for ExportRow {
    fn from(entry: &RankedEntry) -> Self {
        let record = &entry.record;
        Self {
            rank: entry.rank,
            id: record.id,
            title: record.title.clone(),
            media_type: record.media_type.as_str().to_string(),
            status: record.status.map(|s| s.as_str().to_string()),
            country: record.country.clone(),
            genres: record
                .genres
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(GENRE_SEPARATOR),
            score: record.score,
            popularity: record.popularity,
        }
    }
}

/// Render a ranked list as CSV bytes
pub fn render(list: &RankedList) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for entry in &list.entries {
        writer.serialize(ExportRow::from(entry))?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Write a ranked list to `path`, replacing any existing file.
///
/// Returns the number of data rows written.
pub fn export(list: &RankedList, path: &Path) -> Result<usize> {
    let bytes = render(list).map_err(|e| Error::write(path, e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::write(path, e))?;
    }

    let tmp = temp_path(path);
    debug!(path = %tmp.display(), bytes = bytes.len(), "Writing temporary file");

    if let Err(e) = std::fs::write(&tmp, &bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::write(path, e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::write(path, e));
    }

    info!(
        category = %list.category,
        path = %path.display(),
        rows = list.len(),
        "Exported ranking"
    );

    Ok(list.len())
}

/// Read an exported file back into rows
pub fn read_rows(path: &Path) -> anyhow::Result<Vec<ExportRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    if headers.iter().ne(COLUMNS.iter().copied()) {
        anyhow::bail!("Unexpected header in {}: {:?}", path.display(), headers);
    }

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<ExportRow>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::rank_list;
    use shared::{MediaRecord, MediaStatus, MediaType, RankKey, RankingCriterion};
    use tempfile::TempDir;

    fn record(id: u32, title: &str, score: Option<u32>) -> MediaRecord {
        MediaRecord {
            id,
            title: title.to_string(),
            media_type: MediaType::Manga,
            status: Some(MediaStatus::Releasing),
            country: Some("JP".to_string()),
            genres: ["Drama", "Action"].iter().map(|g| g.to_string()).collect(),
            score,
            popularity: Some(id * 1000),
        }
    }

    fn sample() -> RankedList {
        rank_list(
            "All Manga",
            vec![
                record(1, "Berserk", Some(90)),
                record(2, "Vagabond, \"the\" manga", Some(95)),
                record(3, "Unscored", None),
            ],
            RankingCriterion::descending(RankKey::Score),
        )
    }

    #[test]
    fn test_render_layout() {
        let text = String::from_utf8(render(&sample()).unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "rank,id,title,type,status,country,genres,score,popularity");
        assert_eq!(lines[1], "1,2,\"Vagabond, \"\"the\"\" manga\",MANGA,RELEASING,JP,Action;Drama,95,2000");
        assert_eq!(lines[2], "2,1,Berserk,MANGA,RELEASING,JP,Action;Drama,90,1000");
        assert_eq!(lines[3], "3,3,Unscored,MANGA,RELEASING,JP,Action;Drama,,3000");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_empty_list_writes_header_only() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("Empty.csv");
        let list = rank_list("Empty", Vec::new(), RankingCriterion::descending(RankKey::Score));

        assert_eq!(export(&list, &path)?, 0);
        assert_eq!(
            std::fs::read_to_string(&path)?,
            "rank,id,title,type,status,country,genres,score,popularity\n"
        );
        assert!(read_rows(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_round_trip() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("All Manga.csv");
        let list = sample();

        export(&list, &path)?;
        let rows = read_rows(&path)?;

        let expected: Vec<ExportRow> = list.entries.iter().map(ExportRow::from).collect();
        assert_eq!(rows, expected);
        assert_eq!(rows[2].score, None);
        Ok(())
    }

    #[test]
    fn test_export_is_idempotent_and_overwrites() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("All Manga.csv");
        std::fs::write(&path, "stale content that is much longer than nothing\n".repeat(100))?;

        export(&sample(), &path)?;
        let first = std::fs::read(&path)?;
        export(&sample(), &path)?;
        let second = std::fs::read(&path)?;

        assert_eq!(first, second);
        assert!(!String::from_utf8(first)?.contains("stale"));
        assert!(!temp_path(&path).exists());
        Ok(())
    }

    #[test]
    fn test_export_creates_parent_dir() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("rankings/2024/All Manga.csv");

        assert_eq!(export(&sample(), &path)?, 3);
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_unwritable_path_is_write_error() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        // A regular file where a directory is expected
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "x")?;
        let path = blocker.join("All Manga.csv");

        let err = export(&sample(), &path).unwrap_err();
        assert_eq!(err.kind(), "WriteError");
        assert!(err.to_string().contains("All Manga.csv"));
        Ok(())
    }

    #[test]
    fn test_read_rows_rejects_foreign_header() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("other.csv");
        std::fs::write(&path, "id,title,rank\n1,x,1\n")?;

        assert!(read_rows(&path).is_err());
        Ok(())
    }
}
