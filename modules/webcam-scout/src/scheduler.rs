use std::time::{Duration, Instant};

use tracing::{error, info};
use webcam_common::WebcamError;

use crate::scout::Scout;
use crate::stats::CycleStats;

/// Sleep after a failed cycle before trying again.
pub const DEGRADED_SLEEP: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Discovering,
    Detailing,
    Publishing,
    Sleeping { degraded: bool },
}

impl std::fmt::Display for CycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleState::Idle => f.write_str("idle"),
            CycleState::Discovering => f.write_str("discovering"),
            CycleState::Detailing => f.write_str("detailing"),
            CycleState::Publishing => f.write_str("publishing"),
            CycleState::Sleeping { degraded: false } => f.write_str("sleeping"),
            CycleState::Sleeping { degraded: true } => f.write_str("sleeping (degraded)"),
        }
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleStats),
    Failed(anyhow::Error),
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::Completed(_))
    }
}

/// Runs discovery cycles back to back, sleeping the configured interval after
/// a good cycle and [`DEGRADED_SLEEP`] after a failed one.
pub struct Scheduler {
    scout: Scout,
    interval: Duration,
    state: CycleState,
    cycles: u64,
}

impl Scheduler {
    pub fn new(scout: Scout, interval: Duration) -> Self {
        Self {
            scout,
            interval,
            state: CycleState::Idle,
            cycles: 0,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn scout(&self) -> &Scout {
        &self.scout
    }

    /// Run one cycle to completion. Never panics or returns early on an
    /// upstream error; the failure is carried in the outcome. The state is
    /// left at the last stage the cycle reached.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;
        let cycle = self.cycles;
        info!(cycle, "Starting discovery cycle");

        match self.run_inner().await {
            Ok(stats) => {
                info!(cycle, "{stats}");
                CycleOutcome::Completed(stats)
            }
            Err(e) => {
                error!(cycle, error = %format!("{e:#}"), "Cycle failed");
                CycleOutcome::Failed(e)
            }
        }
    }

    async fn run_inner(&mut self) -> anyhow::Result<CycleStats> {
        let started = Instant::now();

        self.state = CycleState::Discovering;
        let discovery = self.scout.discover().await?;
        if discovery.video_ids.is_empty() {
            return Err(WebcamError::NoVideosFound.into());
        }
        let categories = self.scout.categories().await;

        self.state = CycleState::Detailing;
        let (aggregate, report) = self.scout.detail(&discovery.video_ids, &categories).await;

        self.state = CycleState::Publishing;
        let categories_published = aggregate.category_count() as u32;
        self.scout.publish(aggregate).await?;

        Ok(CycleStats {
            videos_discovered: discovery.video_ids.len() as u32,
            search_pages: discovery.pages,
            stop_reason: discovery.stop,
            categories_known: categories.len() as u32,
            details: report,
            categories_published,
            elapsed: started.elapsed(),
        })
    }

    pub fn sleep_duration(&self, outcome: &CycleOutcome) -> Duration {
        if outcome.is_success() {
            self.interval
        } else {
            DEGRADED_SLEEP
        }
    }

    /// Cycle forever.
    pub async fn run(&mut self) {
        loop {
            let outcome = self.run_cycle().await;
            let sleep = self.sleep_duration(&outcome);
            let degraded = !outcome.is_success();
            self.state = CycleState::Sleeping { degraded };
            info!(
                secs = sleep.as_secs(),
                degraded,
                "Next cycle in {}",
                humanize(sleep)
            );
            tokio::time::sleep(sleep).await;
        }
    }
}

fn humanize(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::retry::RetryPolicy;
    use crate::testing::{live_page, quota_exceeded, MockResolver, MockVideoSource};
    use webcam_common::Config;

    fn config(dir: &std::path::Path) -> Config {
        let playlist = dir.join("playlist.m3u8").to_string_lossy().to_string();
        Config::from_lookup(|key| match key {
            "YOUTUBE_API_KEY" => Some("test-key".to_string()),
            "PLAYLIST_PATH" => Some(playlist.clone()),
            _ => None,
        })
        .unwrap()
    }

    fn scheduler(source: MockVideoSource, dir: &std::path::Path) -> Scheduler {
        let cfg = config(dir);
        let scout = Scout::new(&cfg, Arc::new(source), Arc::new(MockResolver::new()))
            .with_retry_policy(RetryPolicy::immediate(2));
        Scheduler::new(scout, cfg.update_interval())
    }

    #[test]
    fn humanizes_sleep() {
        assert_eq!(humanize(Duration::from_secs(5 * 3600)), "5h");
        assert_eq!(humanize(Duration::from_secs(60)), "1m");
        assert_eq!(humanize(Duration::from_secs(90)), "90s");
    }

    #[tokio::test]
    async fn successful_cycle_sleeps_full_interval() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockVideoSource::new()
            .on_page(live_page(&[("a", "2024-05-10T12:00:00Z")]))
            .with_video("a", "Harbor", "19")
            .with_category("19", "Travel & Events");
        let mut scheduler = scheduler(source, dir.path());
        assert_eq!(scheduler.state(), CycleState::Idle);

        let outcome = scheduler.run_cycle().await;

        assert!(outcome.is_success());
        assert_eq!(scheduler.state(), CycleState::Publishing);
        assert_eq!(scheduler.sleep_duration(&outcome), Duration::from_secs(5 * 3600));
        assert!(dir.path().join("playlist.m3u8").exists());
    }

    #[tokio::test]
    async fn empty_discovery_is_a_degraded_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockVideoSource::new().on_search_error(quota_exceeded());
        let mut scheduler = scheduler(source, dir.path());

        let outcome = scheduler.run_cycle().await;

        match &outcome {
            CycleOutcome::Failed(e) => assert!(matches!(
                e.downcast_ref::<WebcamError>(),
                Some(WebcamError::NoVideosFound)
            )),
            CycleOutcome::Completed(_) => panic!("expected failure"),
        }
        assert_eq!(scheduler.sleep_duration(&outcome), DEGRADED_SLEEP);
        assert_eq!(scheduler.state(), CycleState::Discovering);
        assert!(!dir.path().join("playlist.m3u8").exists());
    }

    #[tokio::test]
    async fn run_moves_from_cycle_to_sleeping() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockVideoSource::new()
            .on_page(live_page(&[("a", "2024-05-10T12:00:00Z")]))
            .with_video("a", "Harbor", "19");
        let mut scheduler = scheduler(source, dir.path());

        let stopped = tokio::time::timeout(Duration::from_secs(2), scheduler.run()).await;

        assert!(stopped.is_err());
        assert_eq!(scheduler.state(), CycleState::Sleeping { degraded: false });
        assert!(dir.path().join("playlist.m3u8").exists());
    }

    #[tokio::test]
    async fn failed_cycle_sleeps_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockVideoSource::new().on_search_error(quota_exceeded());
        let mut scheduler = scheduler(source, dir.path());

        let stopped = tokio::time::timeout(Duration::from_millis(500), scheduler.run()).await;

        assert!(stopped.is_err());
        assert_eq!(scheduler.state(), CycleState::Sleeping { degraded: true });
    }

    #[test]
    fn states_display() {
        assert_eq!(CycleState::Sleeping { degraded: true }.to_string(), "sleeping (degraded)");
        assert_eq!(CycleState::Detailing.to_string(), "detailing");
    }
}
