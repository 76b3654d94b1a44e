// Trait seams for the cycle's two external collaborators.
//
// VideoSource covers the three YouTube endpoints a cycle touches.
// StreamResolver turns a video id into a playable URL.
//
// Both have in-memory doubles in `testing` so the whole pipeline runs
// without network access or a yt-dlp install.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use webcam_common::CategoryMap;
use youtube_client::{SearchPage, VideoDetail, YoutubeClient};

#[async_trait]
pub trait VideoSource: Send + Sync {
    /// One page of live search results, newest first, strictly older than
    /// `published_before` when given.
    async fn search_live(
        &self,
        query: &str,
        published_before: Option<DateTime<Utc>>,
    ) -> youtube_client::Result<SearchPage>;

    /// Snippets for at most `youtube_client::MAX_RESULTS` ids.
    async fn video_details(&self, ids: &[String]) -> youtube_client::Result<Vec<VideoDetail>>;

    async fn categories(&self, region_code: &str) -> youtube_client::Result<CategoryMap>;
}

#[async_trait]
impl VideoSource for YoutubeClient {
    async fn search_live(
        &self,
        query: &str,
        published_before: Option<DateTime<Utc>>,
    ) -> youtube_client::Result<SearchPage> {
        YoutubeClient::search_live(self, query, published_before).await
    }

    async fn video_details(&self, ids: &[String]) -> youtube_client::Result<Vec<VideoDetail>> {
        self.videos(ids).await
    }

    async fn categories(&self, region_code: &str) -> youtube_client::Result<CategoryMap> {
        self.video_categories(region_code).await
    }
}

#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Direct stream URL for a video, or `None` when it cannot be resolved
    /// in time. Never fails past this boundary.
    async fn resolve(&self, video_id: &str) -> Option<String>;
    fn name(&self) -> &str;
}
