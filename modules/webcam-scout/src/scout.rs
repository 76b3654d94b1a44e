use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use webcam_common::{CategoryMap, Config, WebcamError};
use youtube_client::{YoutubeClient, YoutubeError};

use crate::aggregate::Aggregate;
use crate::details::{DetailBatcher, DetailReport};
use crate::discovery::{Discovery, Paginator};
use crate::playlist::PlaylistPublisher;
use crate::resolver::YtDlpResolver;
use crate::retry::RetryPolicy;
use crate::traits::{StreamResolver, VideoSource};

/// Owns the collaborators for a cycle and exposes its stages one at a time.
pub struct Scout {
    source: Arc<dyn VideoSource>,
    resolver: Arc<dyn StreamResolver>,
    publisher: PlaylistPublisher,
    retry: RetryPolicy,
    search_query: String,
    region_code: String,
    excluded: BTreeSet<String>,
    max_videos: usize,
    concurrency: usize,
}

impl Scout {
    pub fn new(
        config: &Config,
        source: Arc<dyn VideoSource>,
        resolver: Arc<dyn StreamResolver>,
    ) -> Self {
        Self {
            source,
            resolver,
            publisher: PlaylistPublisher::new(config.playlist_path.clone()),
            retry: RetryPolicy::default(),
            search_query: config.search_query.clone(),
            region_code: config.region_code.clone(),
            excluded: config.excluded_categories.clone(),
            max_videos: config.max_videos,
            concurrency: config.concurrent_extractions,
        }
    }

    /// Production wiring: the YouTube Data API and a local yt-dlp.
    pub fn from_config(config: &Config) -> Self {
        let source = Arc::new(YoutubeClient::new(config.youtube_api_key.clone()));
        let resolver = Arc::new(YtDlpResolver::new(config.yt_dlp_bin.clone()));
        Self::new(config, source, resolver)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn publisher(&self) -> &PlaylistPublisher {
        &self.publisher
    }

    pub async fn discover(&self) -> anyhow::Result<Discovery> {
        Paginator::new(self.source.as_ref(), &self.retry)
            .discover(&self.search_query, self.max_videos)
            .await
    }

    /// Category id → name for the configured region. A failed lookup is not
    /// fatal; every video then lands in the unknown category.
    pub async fn categories(&self) -> CategoryMap {
        let result = self
            .retry
            .run("videoCategories", YoutubeError::is_transient, || {
                self.source.categories(&self.region_code)
            })
            .await;

        match result {
            Ok(map) => {
                info!(count = map.len(), region = self.region_code.as_str(), "Loaded video categories");
                map
            }
            Err(e) => {
                warn!(error = %e, "Failed to load video categories, all videos will be uncategorized");
                CategoryMap::new()
            }
        }
    }

    pub async fn detail(
        &self,
        video_ids: &[String],
        categories: &CategoryMap,
    ) -> (Aggregate, DetailReport) {
        DetailBatcher::new(
            self.source.as_ref(),
            self.resolver.as_ref(),
            &self.retry,
            &self.excluded,
            self.concurrency,
        )
        .fetch_details(video_ids, categories)
        .await
    }

    /// Write the playlist off the async runtime.
    pub async fn publish(&self, aggregate: Aggregate) -> Result<(), WebcamError> {
        let publisher = self.publisher.clone();
        tokio::task::spawn_blocking(move || publisher.publish(&aggregate))
            .await
            .map_err(|e| WebcamError::Publish(format!("publish task failed: {e}")))?
    }
}
