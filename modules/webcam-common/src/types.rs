use std::collections::HashMap;

/// Category name used when a video's category id is missing from the map.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Category id → display name, fetched once per cycle.
pub type CategoryMap = HashMap<String, String>;

/// A video that survived category filtering and is waiting to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub video_id: String,
    pub title: String,
    pub category: String,
}

/// A playable stream ready for the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub title: String,
    pub stream_url: String,
}

impl CandidateEntry {
    pub fn resolved(&self, stream_url: String) -> ResolvedEntry {
        ResolvedEntry {
            title: self.title.clone(),
            stream_url,
        }
    }
}
