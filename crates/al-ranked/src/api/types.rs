//! AniList GraphQL request and response types.
//!
//! These mirror the JSON shapes of the `Page.media` query; they are also the
//! format pages are cached in.

use serde::{Deserialize, Serialize};

/// GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

/// GraphQL response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

/// One entry of the GraphQL `errors` array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

impl GraphQlError {
    /// Join the messages of an `errors` array
    pub fn join(errors: &[GraphQlError]) -> String {
        errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// `data` of a `Page` query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageData {
    #[serde(rename = "Page")]
    pub page: MediaPage,
}

/// One page of media
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPage {
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    pub media: Vec<MediaItem>,
}

impl MediaPage {
    /// Whether another page should be requested
    ///
    /// Without `pageInfo`, a non-empty page is taken to mean more may follow.
    pub fn has_next_page(&self) -> bool {
        self.page_info
            .as_ref()
            .and_then(|info| info.has_next_page)
            .unwrap_or(!self.media.is_empty())
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
}

/// Media entry as returned by AniList
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: u32,
    #[serde(default)]
    pub title: Option<MediaTitle>,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub country_of_origin: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub average_score: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTitle {
    #[serde(default)]
    pub romaji: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
}

impl MediaItem {
    /// Romaji title, then English, then `#<id>`
    pub fn display_title(&self) -> String {
        self.title
            .as_ref()
            .and_then(|t| non_blank(&t.romaji).or_else(|| non_blank(&t.english)))
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

fn non_blank(title: &Option<String>) -> Option<&str> {
    title.as_deref().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        let body = r#"{
            "data": {
                "Page": {
                    "pageInfo": {"currentPage": 1, "hasNextPage": true},
                    "media": [{
                        "id": 16498,
                        "title": {"romaji": "Shingeki no Kyojin", "english": "Attack on Titan"},
                        "type": "ANIME",
                        "status": "FINISHED",
                        "countryOfOrigin": "JP",
                        "genres": ["Action", "Drama"],
                        "averageScore": 85,
                        "popularity": 900000
                    }]
                }
            }
        }"#;

        let response: GraphQlResponse<PageData> = serde_json::from_str(body).unwrap();
        let page = response.data.unwrap().page;
        assert!(page.has_next_page());
        assert_eq!(page.media.len(), 1);
        assert_eq!(page.media[0].display_title(), "Shingeki no Kyojin");
        assert_eq!(page.media[0].average_score, Some(85));
        assert!(response.errors.is_none());
    }

    #[test]
    fn test_parse_errors() {
        let body = r#"{"data": null, "errors": [
            {"message": "Variable \"$status\" got invalid value", "status": 400},
            {"message": "second"}
        ]}"#;

        let response: GraphQlResponse<PageData> = serde_json::from_str(body).unwrap();
        assert!(response.data.is_none());
        let errors = response.errors.unwrap();
        assert_eq!(errors[0].status, Some(400));
        assert_eq!(
            GraphQlError::join(&errors),
            "Variable \"$status\" got invalid value; second"
        );
    }

    #[test]
    fn test_title_fallback() {
        let mut item: MediaItem = serde_json::from_str(r#"{"id": 7, "title": {"romaji": null, "english": "Seven"}}"#).unwrap();
        assert_eq!(item.display_title(), "Seven");

        item.title = None;
        assert_eq!(item.display_title(), "#7");
    }

    #[test]
    fn test_blank_romaji_falls_back_to_english() {
        let item: MediaItem =
            serde_json::from_str(r#"{"id": 8, "title": {"romaji": "  ", "english": "Eight"}}"#).unwrap();
        assert_eq!(item.display_title(), "Eight");

        let item: MediaItem = serde_json::from_str(r#"{"id": 8, "title": {"romaji": "", "english": ""}}"#).unwrap();
        assert_eq!(item.display_title(), "#8");
    }

    #[test]
    fn test_missing_data_and_errors_parse_as_none() {
        let response: GraphQlResponse<PageData> = serde_json::from_str("{}").unwrap();
        assert!(response.data.is_none());
        assert!(response.errors.is_none());
    }

    #[test]
    fn test_has_next_page_without_page_info() {
        let page: MediaPage = serde_json::from_str(r#"{"media": []}"#).unwrap();
        assert!(!page.has_next_page());
    }
}
