//! Search statistics.

use std::time::{Duration, Instant};

/// Counters collected by one search run.
///
/// # Example
///
/// ```
/// use armory_search::SearchStatistics;
///
/// let mut stats = SearchStatistics::default();
/// stats.start();
/// stats.record_leaf();
/// stats.record_leaf();
/// stats.record_match();
///
/// assert_eq!(stats.combinations_evaluated, 2);
/// assert_eq!(stats.matches, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    start_time: Option<Instant>,
    elapsed: Option<Duration>,
    /// Candidates per loadout part before filtering, summed.
    pub candidates_total: usize,
    /// Catalog entries granting none of the desired abilities, summed.
    pub candidates_irrelevant: usize,
    /// Candidates left after static dominance filtering, summed.
    pub candidates_kept: usize,
    /// Product of the filtered candidate counts.
    pub search_space: u128,
    /// Partial combinations expanded (non-leaf advances).
    pub nodes_expanded: u64,
    /// Complete combinations judged.
    pub combinations_evaluated: u64,
    /// Jewel fitter invocations.
    pub fitter_calls: u64,
    /// Branches cut by the optimistic feasibility bound.
    pub pruned_by_bound: u64,
    /// Candidates skipped by dominance on unsatisfied abilities.
    pub pruned_by_dominance: u64,
    pub matches: u64,
    /// Collection stopped at the configured result limit.
    pub truncated: bool,
}

impl SearchStatistics {
    /// Marks the start of the search.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.elapsed = None;
    }

    /// Freezes the elapsed time.
    pub fn finish(&mut self) {
        self.elapsed = Some(self.elapsed());
    }

    /// Time spent so far, or the total once finished.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
            .or_else(|| self.start_time.map(|t| t.elapsed()))
            .unwrap_or_default()
    }

    pub fn record_node(&mut self) {
        self.nodes_expanded += 1;
    }

    pub fn record_leaf(&mut self) {
        self.combinations_evaluated += 1;
    }

    pub fn record_fit(&mut self) {
        self.fitter_calls += 1;
    }

    pub fn record_match(&mut self) {
        self.matches += 1;
    }

    /// Complete combinations judged per second.
    pub fn combinations_per_second(&self) -> u64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            (self.combinations_evaluated as f64 / secs) as u64
        } else {
            0
        }
    }
}
