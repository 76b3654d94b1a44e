pub mod error;
pub mod types;

pub use error::{Result, YoutubeError};
pub use types::{LiveVideo, SearchPage, VideoDetail};

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use types::{CategoryItem, ErrorEnvelope, ListResponse, SearchItem, VideoItem};

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Page size for search and the id limit for `videos.list`.
pub const MAX_RESULTS: usize = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Public watch page for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub struct YoutubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YoutubeClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// One page of live videos matching `query`, newest first.
    /// `published_before` is an exclusive upper bound on publish time.
    pub async fn search_live(
        &self,
        query: &str,
        published_before: Option<DateTime<Utc>>,
    ) -> Result<SearchPage> {
        let mut params = vec![
            ("part", "id,snippet".to_string()),
            ("type", "video".to_string()),
            ("eventType", "live".to_string()),
            ("maxResults", MAX_RESULTS.to_string()),
            ("order", "date".to_string()),
            ("q", query.to_string()),
        ];
        if let Some(before) = published_before {
            params.push(("publishedBefore", published_before_param(before)));
        }

        let resp: ListResponse<SearchItem> = self.get("search", &params).await?;
        let page = resp.into_page();
        tracing::debug!(count = page.items.len(), ?published_before, "Search page fetched");
        Ok(page)
    }

    /// Title and category for up to [`MAX_RESULTS`] videos in one request.
    pub async fn videos(&self, ids: &[String]) -> Result<Vec<VideoDetail>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_RESULTS {
            return Err(YoutubeError::InvalidRequest(format!(
                "videos.list accepts at most {MAX_RESULTS} ids, got {}",
                ids.len()
            )));
        }

        let params = [
            ("part", "snippet".to_string()),
            ("id", ids.join(",")),
            ("maxResults", MAX_RESULTS.to_string()),
        ];
        let resp: ListResponse<VideoItem> = self.get("videos", &params).await?;
        Ok(resp.into_details())
    }

    /// Category id → display name for a region.
    pub async fn video_categories(&self, region_code: &str) -> Result<HashMap<String, String>> {
        let params = [
            ("part", "snippet".to_string()),
            ("regionCode", region_code.to_string()),
        ];
        let resp: ListResponse<CategoryItem> = self.get("videoCategories", &params).await?;
        Ok(resp.into_map())
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// RFC 3339 in UTC with as many fractional digits as the instant carries, so
/// the bound is exactly the previous page's oldest item.
fn published_before_param(before: DateTime<Utc>) -> String {
    before.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Build an `Api` error from a non-2xx response, keeping the first reason
/// YouTube reports so callers can tell quota exhaustion from rate limiting.
fn api_error(status: u16, body: &str) -> YoutubeError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => YoutubeError::Api {
            status,
            reason: env
                .error
                .errors
                .into_iter()
                .next()
                .map(|d| d.reason)
                .unwrap_or_default(),
            message: env.error.message,
        },
        Err(_) => YoutubeError::Api {
            status,
            reason: String::new(),
            message: body.to_string(),
        },
    }
}
