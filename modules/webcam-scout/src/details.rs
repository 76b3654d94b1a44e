use std::collections::BTreeSet;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use webcam_common::{clean_title, CandidateEntry, CategoryMap, UNKNOWN_CATEGORY};
use youtube_client::{VideoDetail, YoutubeError, MAX_RESULTS};

use crate::aggregate::Aggregate;
use crate::retry::RetryPolicy;
use crate::traits::{StreamResolver, VideoSource};

/// Counters for one pass over the discovered ids.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetailReport {
    pub batches: u32,
    pub batches_failed: u32,
    /// Videos dropped because their category is on the exclusion list.
    pub excluded: u32,
    /// Resolutions started.
    pub attempted: u32,
    pub resolved: u32,
}

/// Fetches metadata in batches of [`MAX_RESULTS`] and resolves each batch's
/// survivors with bounded concurrency before moving to the next batch.
pub struct DetailBatcher<'a> {
    source: &'a dyn VideoSource,
    resolver: &'a dyn StreamResolver,
    retry: &'a RetryPolicy,
    excluded: &'a BTreeSet<String>,
    concurrency: usize,
}

impl<'a> DetailBatcher<'a> {
    pub fn new(
        source: &'a dyn VideoSource,
        resolver: &'a dyn StreamResolver,
        retry: &'a RetryPolicy,
        excluded: &'a BTreeSet<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            resolver,
            retry,
            excluded,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn fetch_details(
        &self,
        video_ids: &[String],
        categories: &CategoryMap,
    ) -> (Aggregate, DetailReport) {
        let mut aggregate = Aggregate::new();
        let mut report = DetailReport::default();
        let total_batches = video_ids.len().div_ceil(MAX_RESULTS);

        for (i, batch) in video_ids.chunks(MAX_RESULTS).enumerate() {
            report.batches += 1;

            let details = match self
                .retry
                .run("videos", YoutubeError::is_transient, || {
                    self.source.video_details(batch)
                })
                .await
            {
                Ok(details) => details,
                Err(e) => {
                    warn!(batch = i + 1, total_batches, error = %e, "Metadata batch failed, skipping");
                    report.batches_failed += 1;
                    continue;
                }
            };

            let candidates = self.candidates(details, categories, &mut report);
            report.attempted += candidates.len() as u32;

            let resolved: Vec<_> = stream::iter(candidates)
                .map(|candidate| async move {
                    let url = self.resolver.resolve(&candidate.video_id).await;
                    (candidate, url)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            let mut batch_resolved = 0u32;
            for (candidate, url) in resolved {
                match url {
                    Some(url) => {
                        let entry = candidate.resolved(url);
                        aggregate.insert(candidate.category, entry);
                        batch_resolved += 1;
                    }
                    None => debug!(
                        video_id = candidate.video_id.as_str(),
                        resolver = self.resolver.name(),
                        "No stream URL"
                    ),
                }
            }
            report.resolved += batch_resolved;

            info!(
                batch = i + 1,
                total_batches,
                resolved = batch_resolved,
                running_total = report.resolved,
                "Batch processed"
            );
        }

        aggregate.sort();
        (aggregate, report)
    }

    fn candidates(
        &self,
        details: Vec<VideoDetail>,
        categories: &CategoryMap,
        report: &mut DetailReport,
    ) -> Vec<CandidateEntry> {
        details
            .into_iter()
            .filter_map(|detail| {
                let category = categories
                    .get(&detail.category_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
                if self.excluded.contains(&category) {
                    report.excluded += 1;
                    return None;
                }
                Some(CandidateEntry {
                    title: clean_title(&detail.title),
                    video_id: detail.video_id,
                    category,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockResolver, MockVideoSource};

    fn categories() -> CategoryMap {
        [("19", "Travel & Events"), ("25", "News & Politics"), ("15", "Pets & Animals")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("v{i:03}")).collect()
    }

    #[tokio::test]
    async fn batches_in_fifties() {
        let mut source = MockVideoSource::new();
        for id in ids(120) {
            source = source.with_video(&id, &format!("Cam {id}"), "19");
        }
        let resolver = MockResolver::new();
        let retry = RetryPolicy::immediate(1);
        let excluded = BTreeSet::new();

        let (agg, report) = DetailBatcher::new(&source, &resolver, &retry, &excluded, 4)
            .fetch_details(&ids(120), &categories())
            .await;

        assert_eq!(source.detail_batches(), vec![50, 50, 20]);
        assert_eq!(report.batches, 3);
        assert_eq!(report.resolved, 120);
        assert_eq!(agg.len(), 120);
    }

    #[tokio::test]
    async fn excluded_categories_are_never_resolved() {
        let source = MockVideoSource::new()
            .with_video("a", "Harbor", "19")
            .with_video("b", "Evening bulletin", "25")
            .with_video("c", "Kitten room", "15");
        let resolver = MockResolver::new();
        let retry = RetryPolicy::immediate(1);
        let excluded: BTreeSet<String> = ["News & Politics".to_string()].into();

        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let (agg, report) = DetailBatcher::new(&source, &resolver, &retry, &excluded, 2)
            .fetch_details(&ids, &categories())
            .await;

        assert_eq!(report.excluded, 1);
        assert_eq!(resolver.calls(), 2);
        let names: Vec<&str> = agg.categories().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Pets & Animals", "Travel & Events"]);
    }

    #[tokio::test]
    async fn unknown_category_ids_fall_back() {
        let source = MockVideoSource::new().with_video("a", "Mystery", "999");
        let resolver = MockResolver::new();
        let retry = RetryPolicy::immediate(1);
        let excluded = BTreeSet::new();

        let (agg, _) = DetailBatcher::new(&source, &resolver, &retry, &excluded, 1)
            .fetch_details(&["a".to_string()], &categories())
            .await;

        let (category, entry) = agg.entries().next().unwrap();
        assert_eq!(category, UNKNOWN_CATEGORY);
        assert_eq!(entry.title, "Mystery");
    }

    #[tokio::test]
    async fn titles_are_cleaned_and_unresolved_dropped() {
        let source = MockVideoSource::new()
            .with_video("a", "Café\tcam 🌊", "19")
            .with_video("b", "Dead stream", "19");
        let resolver = MockResolver::new().unresolvable("b");
        let retry = RetryPolicy::immediate(1);
        let excluded = BTreeSet::new();

        let ids = vec!["a".to_string(), "b".to_string()];
        let (agg, report) = DetailBatcher::new(&source, &resolver, &retry, &excluded, 2)
            .fetch_details(&ids, &categories())
            .await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.resolved, 1);
        let titles: Vec<&str> = agg.entries().map(|(_, e)| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Cafe cam"]);
    }
}
