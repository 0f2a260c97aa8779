//! Loop state machine for `dumpsys cpuinfo` loop logs.
//!
//! Feeds classified lines through a two-state machine (no loop open / loop
//! open) and flushes each loop's buffered samples into the detailed records,
//! the per-loop summaries and the [`RankAccumulator`].

use cpuinfo_core::models::{LoadAverages, LoopSummary, ParseStats, ProcessSample};
use cpuinfo_core::{ParserError, Result};
use tracing::{debug, trace, warn};

use crate::aggregator::{LoopAggregator, RankAccumulator};
use crate::classifier::{LineClassifier, LineKind, ProcessLine};

// ── State ─────────────────────────────────────────────────────────────────────

/// The loop currently being collected.
#[derive(Debug)]
struct OpenLoop {
    loop_id: u64,
    timestamp: String,
    load: Option<LoadAverages>,
    buffer: Vec<ProcessSample>,
}

impl OpenLoop {
    fn new(loop_id: u64, timestamp: &str) -> Self {
        Self {
            loop_id,
            timestamp: timestamp.to_string(),
            load: None,
            buffer: Vec::new(),
        }
    }

    fn sample(&self, process: &ProcessLine<'_>) -> ProcessSample {
        ProcessSample {
            loop_id: self.loop_id,
            timestamp: self.timestamp.clone(),
            load: self.load,
            pid: process.pid,
            name: process.name.to_string(),
            cpu: process.cpu,
        }
    }
}

#[derive(Debug)]
enum LoopState {
    NoActiveLoop,
    LoopOpen(OpenLoop),
}

// ── ParsedLog ─────────────────────────────────────────────────────────────────

/// Everything collected by a finished [`LoopParser`].
#[derive(Debug, Clone)]
pub struct ParsedLog {
    /// Samples grouped by loop in encounter order, busiest first within a loop.
    pub records: Vec<ProcessSample>,
    /// One row per loop in encounter order.
    pub loop_summaries: Vec<LoopSummary>,
    /// Samples by rank across all loops, not yet averaged.
    pub ranks: RankAccumulator,
    pub stats: ParseStats,
}

// ── LoopParser ────────────────────────────────────────────────────────────────

/// Stateful single-pass parser. Feed lines with [`LoopParser::feed_line`],
/// then call [`LoopParser::finish`] to flush the last loop.
pub struct LoopParser {
    classifier: LineClassifier,
    strict: bool,
    state: LoopState,
    records: Vec<ProcessSample>,
    loop_summaries: Vec<LoopSummary>,
    ranks: RankAccumulator,
    stats: ParseStats,
}

impl LoopParser {
    /// Create a parser. With `strict`, a load or process line before the
    /// first loop boundary is an error instead of being discarded.
    pub fn new(strict: bool) -> Self {
        Self {
            classifier: LineClassifier::new(),
            strict,
            state: LoopState::NoActiveLoop,
            records: Vec::new(),
            loop_summaries: Vec::new(),
            ranks: RankAccumulator::new(),
            stats: ParseStats::default(),
        }
    }

    /// Classify one raw line and apply it to the current state.
    pub fn feed_line(&mut self, raw: &str) -> Result<()> {
        self.stats.lines_read += 1;
        let line_no = self.stats.lines_read;
        let line = raw.trim();

        match self.classifier.classify(line, line_no)? {
            LineKind::LoopBoundary { loop_id, timestamp } => {
                self.flush();
                debug!("Found Loop: {}, Date: {}", loop_id, timestamp);
                self.stats.loops += 1;
                self.state = LoopState::LoopOpen(OpenLoop::new(loop_id, timestamp));
            }
            LineKind::Load(load) => match &mut self.state {
                LoopState::LoopOpen(open) => {
                    debug!(
                        "Extracted Load: {}, {}, {}",
                        load.one_minute, load.five_minutes, load.ten_minutes
                    );
                    open.load = Some(load);
                    self.stats.load_lines += 1;
                }
                LoopState::NoActiveLoop => self.orphan(line_no, "load")?,
            },
            LineKind::Process(process) => match &mut self.state {
                LoopState::LoopOpen(open) => {
                    debug!(
                        "Extracted Process: {}, PID: {}, CPU: {}%, User: {}%, Kernel: {}%",
                        process.name,
                        process.pid,
                        process.cpu.total,
                        process.cpu.user,
                        process.cpu.kernel
                    );
                    let sample = open.sample(&process);
                    open.buffer.push(sample);
                    self.stats.samples += 1;
                }
                LoopState::NoActiveLoop => self.orphan(line_no, "process")?,
            },
            LineKind::Unrecognized => {
                trace!("Skipping line {}: {}", line_no, line);
                self.stats.unrecognized_lines += 1;
            }
        }

        Ok(())
    }

    /// Flush the open loop, if any, and return the collected output.
    pub fn finish(mut self) -> ParsedLog {
        self.flush();
        ParsedLog {
            records: self.records,
            loop_summaries: self.loop_summaries,
            ranks: self.ranks,
            stats: self.stats,
        }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Rank the open loop's samples by descending CPU (stable), then move them
    /// into the rank accumulator, the detailed records and a loop summary.
    /// Leaves the parser with no open loop.
    fn flush(&mut self) {
        let LoopState::LoopOpen(mut open) =
            std::mem::replace(&mut self.state, LoopState::NoActiveLoop)
        else {
            return;
        };

        open.buffer.sort_by(|a, b| b.cpu.total.total_cmp(&a.cpu.total));

        self.ranks.record_loop(&open.buffer);
        self.loop_summaries.push(LoopAggregator::summarize_loop(
            open.loop_id,
            &open.timestamp,
            open.load,
            &open.buffer,
        ));
        self.records.append(&mut open.buffer);
    }

    fn orphan(&mut self, line_no: usize, kind: &'static str) -> Result<()> {
        if self.strict {
            return Err(ParserError::OrphanLine { line_no, kind });
        }
        warn!(
            "Discarding {} line {} found before any loop boundary",
            kind, line_no
        );
        self.stats.orphan_lines += 1;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const LOOP_1: &str = "=== Loop:1, Cmd:dumpsys cpuinfo, Date:2024-01-01 00:00:00";
    const LOOP_2: &str = "=== Loop:2, Cmd:dumpsys cpuinfo, Date:2024-01-01 00:00:05";

    fn parse(lines: &[&str]) -> ParsedLog {
        let mut parser = LoopParser::new(false);
        for line in lines {
            parser.feed_line(line).unwrap();
        }
        parser.finish()
    }

    // ── Flush ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_single_loop_is_flushed_at_end() {
        let log = parse(&[
            LOOP_1,
            "Load: 1.0 / 2.0 / 3.0",
            "10.0% 200/bar: 5.0% user + 5.0% kernel",
            "50.0% 100/foo: 30.0% user + 20.0% kernel",
        ]);

        assert_eq!(log.records.len(), 2);
        assert_eq!(log.records[0].name, "foo");
        assert_eq!(log.records[1].name, "bar");
        assert_eq!(log.records[0].timestamp, "2024-01-01 00:00:00");
        assert_eq!(log.records[0].load.map(|l| l.five_minutes), Some(2.0));

        assert_eq!(log.loop_summaries.len(), 1);
        assert_eq!(log.loop_summaries[0].averages.total, 30.0);
        assert_eq!(log.loop_summaries[0].process_count, 2);
        assert_eq!(log.ranks.depth(), 2);
    }

    #[test]
    fn test_ties_keep_appearance_order() {
        let log = parse(&[
            LOOP_1,
            "5.0% 1/first: 5.0% user + 0.0% kernel",
            "9.0% 2/top: 9.0% user + 0.0% kernel",
            "5.0% 3/second: 5.0% user + 0.0% kernel",
            "5.0% 4/third: 5.0% user + 0.0% kernel",
        ]);
        let names: Vec<&str> = log.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_boundary_flushes_previous_loop() {
        let log = parse(&[
            LOOP_1,
            "1.0% 1/a: 1.0% user + 0.0% kernel",
            LOOP_2,
            "2.0% 2/b: 2.0% user + 0.0% kernel",
        ]);
        assert_eq!(log.stats.loops, 2);
        assert_eq!(log.records[0].loop_id, 1);
        assert_eq!(log.records[1].loop_id, 2);
        assert_eq!(log.loop_summaries[1].loop_id, 2);
        assert_eq!(log.loop_summaries[1].timestamp, "2024-01-01 00:00:05");
    }

    #[test]
    fn test_empty_loop_still_summarized() {
        let log = parse(&[LOOP_1, LOOP_2, "2.0% 2/b: 2.0% user + 0.0% kernel"]);
        assert_eq!(log.loop_summaries.len(), 2);
        assert_eq!(log.loop_summaries[0].process_count, 0);
        assert_eq!(log.loop_summaries[0].averages.total, 0.0);
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.ranks.contributions(0).len(), 1);
    }

    #[test]
    fn test_no_boundary_produces_nothing() {
        let log = parse(&["random text", ""]);
        assert!(log.records.is_empty());
        assert!(log.loop_summaries.is_empty());
        assert_eq!(log.ranks.depth(), 0);
        assert_eq!(log.stats.lines_read, 2);
        assert_eq!(log.stats.unrecognized_lines, 2);
    }

    // ── Load handling ─────────────────────────────────────────────────────────

    #[test]
    fn test_process_before_load_has_no_load() {
        let log = parse(&[
            LOOP_1,
            "1.0% 1/early: 1.0% user + 0.0% kernel",
            "Load: 4.0 / 5.0 / 6.0",
            "0.5% 2/late: 0.5% user + 0.0% kernel",
        ]);
        assert!(log.records[0].load.is_none());
        assert_eq!(log.records[1].load.map(|l| l.one_minute), Some(4.0));
        assert_eq!(log.loop_summaries[0].load.map(|l| l.ten_minutes), Some(6.0));
    }

    #[test]
    fn test_last_load_line_wins() {
        let log = parse(&[LOOP_1, "Load: 1.0 / 1.0 / 1.0", "Load: 7.0 / 8.0 / 9.0"]);
        assert_eq!(log.loop_summaries[0].load.map(|l| l.one_minute), Some(7.0));
        assert_eq!(log.stats.load_lines, 2);
    }

    #[test]
    fn test_load_resets_on_new_loop() {
        let log = parse(&[LOOP_1, "Load: 1.0 / 1.0 / 1.0", LOOP_2]);
        assert!(log.loop_summaries[1].load.is_none());
    }

    // ── Orphans ───────────────────────────────────────────────────────────────

    #[test]
    fn test_orphan_lines_discarded_in_lenient_mode() {
        let log = parse(&[
            "Load: 1.0 / 1.0 / 1.0",
            "99.0% 1/ghost: 50.0% user + 49.0% kernel",
            LOOP_1,
            "1.0% 2/real: 1.0% user + 0.0% kernel",
        ]);
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.records[0].name, "real");
        assert!(log.records[0].load.is_none());
        assert_eq!(log.stats.orphan_lines, 2);
    }

    #[test]
    fn test_orphan_process_line_is_error_in_strict_mode() {
        let mut parser = LoopParser::new(true);
        parser.feed_line("header").unwrap();
        let err = parser
            .feed_line("99.0% 1/ghost: 50.0% user + 49.0% kernel")
            .unwrap_err();
        assert!(matches!(
            err,
            ParserError::OrphanLine {
                line_no: 2,
                kind: "process"
            }
        ));
    }

    #[test]
    fn test_strict_mode_accepts_well_formed_log() {
        let mut parser = LoopParser::new(true);
        for line in [LOOP_1, "Load: 1.0 / 1.0 / 1.0", "1.0% 2/a: 1.0% user + 0.0% kernel"] {
            parser.feed_line(line).unwrap();
        }
        assert_eq!(parser.finish().records.len(), 1);
    }

    // ── Errors ────────────────────────────────────────────────────────────────

    #[test]
    fn test_invalid_number_aborts() {
        let mut parser = LoopParser::new(false);
        parser.feed_line(LOOP_1).unwrap();
        let err = parser.feed_line("1.0% 2/a: 1..0% user + 0.0% kernel");
        assert!(matches!(err, Err(ParserError::InvalidNumber { line_no: 2, .. })));
    }

    #[test]
    fn test_lines_are_trimmed() {
        let log = parse(&[
            "   === Loop:5, Cmd:dumpsys cpuinfo, Date:Mon Jan 1   ",
            "\t 4.0% 10/x: 2.0% user + 2.0% kernel",
        ]);
        assert_eq!(log.loop_summaries[0].loop_id, 5);
        assert_eq!(log.loop_summaries[0].timestamp, "Mon Jan 1");
        assert_eq!(log.records.len(), 1);
    }
}
