use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use youtube_client::watch_url;

use crate::traits::StreamResolver;

/// Per-video budget for yt-dlp. Live streams that take longer than this are
/// usually stuck in a waiting room.
pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves watch pages to direct stream URLs with `yt-dlp --get-url`.
pub struct YtDlpResolver {
    bin: String,
    timeout: Duration,
}

impl YtDlpResolver {
    pub fn new(bin: impl Into<String>) -> Self {
        let bin = bin.into();
        info!(bin = bin.as_str(), timeout_secs = RESOLVE_TIMEOUT.as_secs(), "Using yt-dlp resolver");
        Self {
            bin,
            timeout: RESOLVE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl StreamResolver for YtDlpResolver {
    async fn resolve(&self, video_id: &str) -> Option<String> {
        let url = watch_url(video_id);

        let result = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&self.bin)
                .args(["--quiet", "--no-warnings", "--get-url", &url])
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) if output.status.success() => {
                let stream_url = select_stream_url(&String::from_utf8_lossy(&output.stdout));
                if stream_url.is_none() {
                    debug!(video_id, "yt-dlp succeeded but printed no URL");
                }
                stream_url
            }
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                debug!(video_id, status = %output.status, stderr = %stderr.trim(), "yt-dlp exited with error");
                None
            }
            Ok(Err(e)) => {
                warn!(video_id, bin = self.bin.as_str(), error = %e, "Failed to run yt-dlp");
                None
            }
            Err(_) => {
                debug!(video_id, timeout_secs = self.timeout.as_secs(), "yt-dlp timed out");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "yt-dlp"
    }
}

/// yt-dlp prints one URL per selected format; the last one is the best
/// variant.
pub fn select_stream_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}
