use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

// --- Public types ---

/// One live broadcast returned by a search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveVideo {
    pub video_id: String,
    pub published_at: DateTime<Utc>,
}

/// One page of live search results, newest first.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<LiveVideo>,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Publish time of the oldest item on the page; the next page is
    /// requested with this as its exclusive upper bound.
    pub fn oldest_published_at(&self) -> Option<DateTime<Utc>> {
        self.items.iter().map(|v| v.published_at).min()
    }
}

/// Snippet fields needed to categorize a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetail {
    pub video_id: String,
    pub title: String,
    pub category_id: String,
}

// --- Wire types ---

/// Envelope shared by every `*.list` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub id: SearchItemId,
    pub snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchItemId {
    /// Absent for channel and playlist hits.
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchSnippet {
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryItem {
    pub id: String,
    pub snippet: CategorySnippet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategorySnippet {
    pub title: String,
}

/// `{"error": {"code": 403, "message": "...", "errors": [{"reason": "quotaExceeded"}]}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub reason: String,
}

// --- Conversions ---

impl ListResponse<SearchItem> {
    pub(crate) fn into_page(self) -> SearchPage {
        let items = self
            .items
            .into_iter()
            .filter_map(|item| {
                Some(LiveVideo {
                    video_id: item.id.video_id?,
                    published_at: item.snippet.published_at,
                })
            })
            .collect();
        SearchPage { items }
    }
}

impl ListResponse<VideoItem> {
    pub(crate) fn into_details(self) -> Vec<VideoDetail> {
        self.items
            .into_iter()
            .map(|item| VideoDetail {
                video_id: item.id,
                title: item.snippet.title,
                category_id: item.snippet.category_id,
            })
            .collect()
    }
}

impl ListResponse<CategoryItem> {
    pub(crate) fn into_map(self) -> HashMap<String, String> {
        self.items
            .into_iter()
            .map(|item| (item.id, item.snippet.title))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_page_skips_non_video_hits() {
        let json = r#"{
            "kind": "youtube#searchListResponse",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "abc"},
                 "snippet": {"publishedAt": "2024-05-01T12:00:00Z", "title": "Harbor cam"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC1"},
                 "snippet": {"publishedAt": "2024-05-01T11:00:00Z", "title": "A channel"}},
                {"id": {"kind": "youtube#video", "videoId": "def"},
                 "snippet": {"publishedAt": "2024-04-30T08:30:00Z", "title": "Zoo cam"}}
            ]
        }"#;
        let resp: ListResponse<SearchItem> = serde_json::from_str(json).unwrap();
        let page = resp.into_page();

        let ids: Vec<_> = page.items.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["abc", "def"]);
        assert_eq!(
            page.oldest_published_at().unwrap().to_rfc3339(),
            "2024-04-30T08:30:00+00:00"
        );
    }

    #[test]
    fn missing_items_is_an_empty_page() {
        let resp: ListResponse<SearchItem> =
            serde_json::from_str(r#"{"kind": "youtube#searchListResponse"}"#).unwrap();
        let page = resp.into_page();
        assert!(page.is_empty());
        assert!(page.oldest_published_at().is_none());
    }

    #[test]
    fn video_and_category_snippets_parse() {
        let videos: ListResponse<VideoItem> = serde_json::from_str(
            r#"{"items": [{"id": "abc", "snippet": {"title": "Beach", "categoryId": "19"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            videos.into_details(),
            vec![VideoDetail {
                video_id: "abc".into(),
                title: "Beach".into(),
                category_id: "19".into(),
            }]
        );

        let categories: ListResponse<CategoryItem> = serde_json::from_str(
            r#"{"items": [{"id": "19", "snippet": {"title": "Travel & Events"}}]}"#,
        )
        .unwrap();
        let map = categories.into_map();
        assert_eq!(map.get("19").map(String::as_str), Some("Travel & Events"));
    }

    #[test]
    fn error_envelope_exposes_reason() {
        let env: ErrorEnvelope = serde_json::from_str(
            r#"{"error": {"code": 403, "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{"message": "...", "domain": "youtube.quota", "reason": "quotaExceeded"}]}}"#,
        )
        .unwrap();
        assert_eq!(env.error.errors[0].reason, "quotaExceeded");
        assert!(env.error.message.contains("quota"));
    }
}
