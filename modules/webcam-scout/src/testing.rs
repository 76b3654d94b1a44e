// In-memory doubles for VideoSource and StreamResolver.
//
// Available to this crate's unit tests and, via the `test-support` feature,
// to the integration tests under `tests/`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use webcam_common::CategoryMap;
use youtube_client::{LiveVideo, SearchPage, VideoDetail, YoutubeError};

use crate::traits::{StreamResolver, VideoSource};

/// Build a search page from `(video_id, rfc3339 published_at)` pairs.
pub fn live_page(items: &[(&str, &str)]) -> SearchPage {
    SearchPage {
        items: items
            .iter()
            .map(|(id, ts)| LiveVideo {
                video_id: id.to_string(),
                published_at: DateTime::parse_from_rfc3339(ts)
                    .expect("valid rfc3339 timestamp")
                    .with_timezone(&Utc),
            })
            .collect(),
    }
}

pub fn quota_exceeded() -> YoutubeError {
    YoutubeError::Api {
        status: 403,
        reason: "quotaExceeded".into(),
        message: "The request cannot be completed because you have exceeded your quota.".into(),
    }
}

pub fn server_error() -> YoutubeError {
    YoutubeError::Api {
        status: 503,
        reason: "backendError".into(),
        message: "Backend Error".into(),
    }
}

// ---------------------------------------------------------------------------
// MockVideoSource
// ---------------------------------------------------------------------------

/// Scripted YouTube API.
///
/// Search responses are served from a queue in order; once the queue is
/// drained every further search returns an empty page. Detail lookups answer
/// from a fixed table and can be made to fail for any batch containing a
/// given id.
pub struct MockVideoSource {
    pages: Mutex<VecDeque<youtube_client::Result<SearchPage>>>,
    details: HashMap<String, VideoDetail>,
    failing_ids: HashMap<String, YoutubeError>,
    categories: youtube_client::Result<CategoryMap>,
    search_cursors: Mutex<Vec<Option<DateTime<Utc>>>>,
    detail_batches: Mutex<Vec<usize>>,
}

impl Default for MockVideoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVideoSource {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(VecDeque::new()),
            details: HashMap::new(),
            failing_ids: HashMap::new(),
            categories: Ok(CategoryMap::new()),
            search_cursors: Mutex::new(Vec::new()),
            detail_batches: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(self, page: SearchPage) -> Self {
        self.pages.lock().unwrap().push_back(Ok(page));
        self
    }

    pub fn on_search_error(self, error: YoutubeError) -> Self {
        self.pages.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_video(mut self, video_id: &str, title: &str, category_id: &str) -> Self {
        self.details.insert(
            video_id.to_string(),
            VideoDetail {
                video_id: video_id.to_string(),
                title: title.to_string(),
                category_id: category_id.to_string(),
            },
        );
        self
    }

    pub fn with_category(mut self, id: &str, name: &str) -> Self {
        if let Ok(map) = &mut self.categories {
            map.insert(id.to_string(), name.to_string());
        }
        self
    }

    pub fn fail_categories(mut self, error: YoutubeError) -> Self {
        self.categories = Err(error);
        self
    }

    /// Any detail batch that includes `video_id` fails with `error`.
    pub fn fail_details_containing(mut self, video_id: &str, error: YoutubeError) -> Self {
        self.failing_ids.insert(video_id.to_string(), error);
        self
    }

    /// `published_before` of every search call, in call order.
    pub fn search_cursors(&self) -> Vec<Option<DateTime<Utc>>> {
        self.search_cursors.lock().unwrap().clone()
    }

    /// Size of every detail batch requested, in call order.
    pub fn detail_batches(&self) -> Vec<usize> {
        self.detail_batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSource for MockVideoSource {
    async fn search_live(
        &self,
        _query: &str,
        published_before: Option<DateTime<Utc>>,
    ) -> youtube_client::Result<SearchPage> {
        self.search_cursors.lock().unwrap().push(published_before);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }

    async fn video_details(&self, ids: &[String]) -> youtube_client::Result<Vec<VideoDetail>> {
        self.detail_batches.lock().unwrap().push(ids.len());
        if let Some(err) = ids.iter().find_map(|id| self.failing_ids.get(id)) {
            return Err(err.clone());
        }
        Ok(ids.iter().filter_map(|id| self.details.get(id).cloned()).collect())
    }

    async fn categories(&self, _region_code: &str) -> youtube_client::Result<CategoryMap> {
        self.categories.clone()
    }
}

// ---------------------------------------------------------------------------
// MockResolver
// ---------------------------------------------------------------------------

/// Resolves every id to `https://stream.test/<id>.m3u8` unless told
/// otherwise. Tracks how many resolutions ran at once.
pub struct MockResolver {
    unresolvable: HashSet<String>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            unresolvable: HashSet::new(),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn stream_url(video_id: &str) -> String {
        format!("https://stream.test/{video_id}.m3u8")
    }

    pub fn unresolvable(mut self, video_id: &str) -> Self {
        self.unresolvable.insert(video_id.to_string());
        self
    }

    /// Hold every resolution open for `delay` so overlapping calls show up in
    /// [`MockResolver::peak_in_flight`].
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamResolver for MockResolver {
    async fn resolve(&self, video_id: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.unresolvable.contains(video_id) {
            None
        } else {
            Some(Self::stream_url(video_id))
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
