use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;
use webcam_common::WebcamError;

use crate::aggregate::Aggregate;

const GENERATOR: &str = "webcam-scout";

/// Render the aggregate as an extended M3U document.
pub fn render(aggregate: &Aggregate, updated_at: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("#EXTM3U\n");
    let _ = writeln!(out, "# Generated by {GENERATOR}");
    let _ = writeln!(out, "# Last updated: {}", updated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "# Streams: {}", aggregate.len());
    out.push('\n');

    for (category, entry) in aggregate.entries() {
        let group = category.replace('"', "'");
        let _ = writeln!(out, "#EXTINF:-1 group-title=\"{group}\", {}", entry.title);
        let _ = writeln!(out, "{}", entry.stream_url);
    }
    out
}

/// Writes the playlist so readers only ever see a complete file: content
/// goes to a temporary file beside the target which then replaces it by
/// rename.
#[derive(Debug, Clone)]
pub struct PlaylistPublisher {
    path: PathBuf,
}

impl PlaylistPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn publish(&self, aggregate: &Aggregate) -> Result<(), WebcamError> {
        let body = render(aggregate, Local::now());
        self.write_atomic(|file| file.write_all(body.as_bytes()))
            .map_err(|e| WebcamError::Publish(format!("{}: {e}", self.path.display())))?;

        info!(
            path = %self.path.display(),
            streams = aggregate.len(),
            categories = aggregate.category_count(),
            "Playlist published"
        );
        Ok(())
    }

    /// Run `write` against a fresh temporary file in the target directory and
    /// rename it over the target. If `write` or the rename fails the target is
    /// left untouched and the temporary file is deleted.
    pub fn write_atomic<F>(&self, write: F) -> io::Result<()>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".playlist-")
            .suffix(".tmp")
            .tempfile_in(dir)?;

        write(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }

        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
