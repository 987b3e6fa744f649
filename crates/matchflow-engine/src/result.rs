//! Pump run summary.

/// Aggregate counts for a pump run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PumpSummary {
    /// Items that produced a success outcome.
    pub succeeded: u64,
    /// Items skipped after malformed or retryable failures.
    pub failed: u64,
    /// Wall-clock duration of the run.
    pub duration_secs: f64,
}

impl PumpSummary {
    /// Total items consumed from the source.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_both_counters() {
        let summary = PumpSummary {
            succeeded: 9,
            failed: 1,
            duration_secs: 0.5,
        };
        assert_eq!(summary.total(), 10);
    }
}
