use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use youtube_client::YoutubeError;

use crate::retry::RetryPolicy;
use crate::traits::VideoSource;

/// Why discovery stopped asking for more pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Collected `cap` ids.
    CapReached,
    /// The search returned an empty page.
    Exhausted,
    /// The API reported the daily quota as spent.
    QuotaExhausted,
    /// The oldest publish time on a page did not move the cursor backwards.
    CursorStalled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StopReason::CapReached => "cap reached",
            StopReason::Exhausted => "no more results",
            StopReason::QuotaExhausted => "quota exhausted",
            StopReason::CursorStalled => "cursor stalled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct Discovery {
    pub video_ids: Vec<String>,
    pub pages: u32,
    pub stop: StopReason,
}

/// Pages backwards through live search results using the oldest publish
/// time of each page as the next page's exclusive upper bound.
pub struct Paginator<'a> {
    source: &'a dyn VideoSource,
    retry: &'a RetryPolicy,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a dyn VideoSource, retry: &'a RetryPolicy) -> Self {
        Self { source, retry }
    }

    /// Collect at most `cap` live video ids for `query`, newest first.
    ///
    /// Quota exhaustion ends discovery with whatever was collected so far.
    /// Any other error that survives the retry policy is returned.
    pub async fn discover(&self, query: &str, cap: usize) -> Result<Discovery> {
        let mut video_ids: Vec<String> = Vec::new();
        let mut cursor: Option<DateTime<Utc>> = None;
        let mut pages = 0u32;

        let stop = loop {
            if video_ids.len() >= cap {
                break StopReason::CapReached;
            }

            let result = self
                .retry
                .run("search", YoutubeError::is_transient, || {
                    self.source.search_live(query, cursor)
                })
                .await;

            let page = match result {
                Ok(page) => page,
                Err(e) if e.is_quota_exhausted() => {
                    warn!(
                        error = %e,
                        collected = video_ids.len(),
                        "API quota exceeded, keeping videos collected so far"
                    );
                    break StopReason::QuotaExhausted;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Live search failed after {} videos", video_ids.len())
                    });
                }
            };
            pages += 1;

            if page.is_empty() {
                info!("No more results available");
                break StopReason::Exhausted;
            }

            let oldest = page.oldest_published_at();
            let added = page.items.len();
            video_ids.extend(page.items.into_iter().map(|v| v.video_id));
            info!(added, total = video_ids.len(), "Search page fetched");

            if video_ids.len() >= cap {
                break StopReason::CapReached;
            }

            match oldest {
                Some(oldest) if cursor.map_or(true, |c| oldest < c) => cursor = Some(oldest),
                _ => {
                    warn!(?cursor, ?oldest, "Search cursor did not move backwards, stopping");
                    break StopReason::CursorStalled;
                }
            }
        };

        video_ids.truncate(cap);
        info!(count = video_ids.len(), pages, reason = %stop, "Discovery complete");

        Ok(Discovery {
            video_ids,
            pages,
            stop,
        })
    }
}
