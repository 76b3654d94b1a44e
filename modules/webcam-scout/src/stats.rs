use std::time::Duration;

use crate::details::DetailReport;
use crate::discovery::StopReason;

/// Stats from one discovery cycle.
#[derive(Debug, Clone)]
pub struct CycleStats {
    pub videos_discovered: u32,
    pub search_pages: u32,
    pub stop_reason: StopReason,
    pub categories_known: u32,
    pub details: DetailReport,
    pub categories_published: u32,
    pub elapsed: Duration,
}

impl std::fmt::Display for CycleStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Cycle Complete ===")?;
        writeln!(f, "Videos discovered:  {}", self.videos_discovered)?;
        writeln!(f, "Search pages:       {}", self.search_pages)?;
        writeln!(f, "Stopped because:    {}", self.stop_reason)?;
        writeln!(f, "Known categories:   {}", self.categories_known)?;
        writeln!(
            f,
            "Metadata batches:   {} ({} failed)",
            self.details.batches, self.details.batches_failed
        )?;
        writeln!(f, "Excluded:           {}", self.details.excluded)?;
        let attempted = self.details.attempted.max(1);
        writeln!(
            f,
            "Streams resolved:   {}/{} ({:.0}%)",
            self.details.resolved,
            self.details.attempted,
            self.details.resolved as f64 / attempted as f64 * 100.0
        )?;
        writeln!(
            f,
            "Unresolved:         {}",
            self.details.attempted.saturating_sub(self.details.resolved)
        )?;
        writeln!(f, "Categories:         {}", self.categories_published)?;
        write!(f, "Elapsed:            {:.1}s", self.elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_success_rate() {
        let stats = CycleStats {
            videos_discovered: 120,
            search_pages: 3,
            stop_reason: StopReason::Exhausted,
            categories_known: 30,
            details: DetailReport {
                batches: 3,
                batches_failed: 1,
                excluded: 10,
                attempted: 60,
                resolved: 45,
            },
            categories_published: 4,
            elapsed: Duration::from_millis(12_340),
        };
        let text = stats.to_string();
        assert!(text.contains("Metadata batches:   3 (1 failed)"));
        assert!(text.contains("Streams resolved:   45/60 (75%)"));
        assert!(text.contains("Stopped because:    no more results"));
        assert!(text.ends_with("Elapsed:            12.3s"));
    }
}
