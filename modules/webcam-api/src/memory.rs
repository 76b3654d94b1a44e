use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Resident memory of this process in MiB, rounded to two decimals.
/// Returns 0.0 when the platform does not expose it.
pub fn resident_memory_mb() -> f64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0.0;
    };

    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );

    system
        .process(pid)
        .map(|p| round2(p.memory() as f64 / (1024.0 * 1024.0)))
        .unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(0.001), 0.0);
    }

    #[test]
    fn reports_non_negative_memory() {
        let mb = resident_memory_mb();
        assert!(mb >= 0.0);
        assert_eq!(round2(mb), mb);
    }
}
