//! Per-loop and rank-based CPU averaging.

use cpuinfo_core::calculations::CpuAverager;
use cpuinfo_core::models::{CpuUsage, LoadAverages, LoopSummary, ProcessSample, RankSummary};

// ── LoopAggregator ────────────────────────────────────────────────────────────

/// Stateless helper that turns one loop's samples into a [`LoopSummary`].
pub struct LoopAggregator;

impl LoopAggregator {
    /// Average the loop's CPU figures. Sample order does not matter.
    ///
    /// A loop without processes still yields a row, with zero averages and a
    /// zero count.
    pub fn summarize_loop(
        loop_id: u64,
        timestamp: &str,
        load: Option<LoadAverages>,
        samples: &[ProcessSample],
    ) -> LoopSummary {
        let (averages, process_count) = CpuAverager::mean(samples.iter().map(|s| s.cpu));
        LoopSummary {
            loop_id,
            timestamp: timestamp.to_string(),
            load,
            averages,
            process_count,
        }
    }
}

// ── RankAccumulator ───────────────────────────────────────────────────────────

/// CPU figures grouped by the position a process held in its loop.
///
/// Index 0 collects the busiest process of every loop, index 1 the second
/// busiest, and so on. Identity is ignored: different processes may share a
/// rank across loops. Ranks are allocated lazily, so every stored rank has at
/// least one contribution.
#[derive(Debug, Clone, Default)]
pub struct RankAccumulator {
    ranks: Vec<Vec<CpuUsage>>,
}

impl RankAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loop's samples, which must already be in rank order.
    pub fn record_loop(&mut self, ranked: &[ProcessSample]) {
        for (rank, sample) in ranked.iter().enumerate() {
            if rank == self.ranks.len() {
                self.ranks.push(Vec::new());
            }
            self.ranks[rank].push(sample.cpu);
        }
    }

    /// Number of populated ranks (the deepest loop seen so far).
    pub fn depth(&self) -> usize {
        self.ranks.len()
    }

    /// Contributions recorded for the 0-based `rank`.
    pub fn contributions(&self, rank: usize) -> &[CpuUsage] {
        self.ranks.get(rank).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Consume the accumulator into one row per rank, ascending, 1-based.
    pub fn into_rank_summaries(self) -> Vec<RankSummary> {
        self.ranks
            .into_iter()
            .enumerate()
            .map(|(index, cpus)| {
                let (averages, process_count) = CpuAverager::mean(cpus);
                RankSummary {
                    rank: index + 1,
                    averages,
                    process_count,
                }
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
