use serde::Serialize;

/// System load averages attached to one loop (`Load: a / b / c`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadAverages {
    /// 1-minute load average.
    pub one_minute: f64,
    /// 5-minute load average.
    pub five_minutes: f64,
    /// 10-minute load average.
    pub ten_minutes: f64,
}

/// Total, user and kernel CPU percentages.
///
/// Used both for a single process and for averages over many processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CpuUsage {
    /// Total CPU percentage.
    pub total: f64,
    /// User-space CPU percentage.
    pub user: f64,
    /// Kernel CPU percentage.
    pub kernel: f64,
}

/// One process's CPU figures within one loop.
///
/// Loop-level fields (id, timestamp, load) are repeated on every sample so the
/// detailed output stays denormalised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSample {
    /// Counter from the loop boundary line this sample belongs to.
    pub loop_id: u64,
    /// Free-text date of the loop, stored verbatim.
    pub timestamp: String,
    /// Load averages seen so far in the loop, `None` before any load line.
    pub load: Option<LoadAverages>,
    /// Process id.
    pub pid: u32,
    /// Process name as printed in the log.
    pub name: String,
    /// CPU figures for this process.
    pub cpu: CpuUsage,
}

/// Per-loop averages, one row per loop boundary encountered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopSummary {
    pub loop_id: u64,
    pub timestamp: String,
    pub load: Option<LoadAverages>,
    /// Mean CPU figures across the loop's processes, rounded to 2 decimals.
    /// All zero when the loop has no processes.
    pub averages: CpuUsage,
    pub process_count: usize,
}

/// Averages over every process that held the same rank across loops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankSummary {
    /// 1-based rank (1 = busiest process of its loop).
    pub rank: usize,
    pub averages: CpuUsage,
    /// Number of loops that had a process at this rank.
    pub process_count: usize,
}

/// Line-level counters collected during a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Total number of input lines seen.
    pub lines_read: usize,
    /// Loop boundaries encountered.
    pub loops: usize,
    /// Process samples kept.
    pub samples: usize,
    /// Load lines applied to an open loop.
    pub load_lines: usize,
    /// Lines matching no grammar.
    pub unrecognized_lines: usize,
    /// Load or process lines discarded because no loop was open.
    pub orphan_lines: usize,
}
