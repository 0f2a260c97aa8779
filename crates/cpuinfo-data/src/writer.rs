//! CSV output for detailed records, loop summaries and rank summaries.
//!
//! Each file gets its header row even when there are no data rows. Missing
//! load averages are written as empty fields.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use cpuinfo_core::models::{LoopSummary, ProcessSample, RankSummary};
use cpuinfo_core::{ParserError, Result};
use serde::Serialize;

pub const DETAILED_HEADERS: [&str; 10] = [
    "Loop",
    "Timestamp",
    "Load_1m",
    "Load_5m",
    "Load_10m",
    "PID",
    "Process",
    "CPU_Usage",
    "User_CPU",
    "Kernel_CPU",
];

pub const SUMMARY_HEADERS: [&str; 9] = [
    "Loop",
    "Timestamp",
    "Load_1m",
    "Load_5m",
    "Load_10m",
    "Avg_CPU_Usage",
    "Avg_User_CPU",
    "Avg_Kernel_CPU",
    "Process_Count",
];

pub const RANK_HEADERS: [&str; 5] = [
    "Rank",
    "Avg_CPU_Usage",
    "Avg_User_CPU",
    "Avg_Kernel_CPU",
    "Process_Count",
];

// ── Row shapes ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DetailedRow<'a> {
    loop_id: u64,
    timestamp: &'a str,
    load_1m: Option<f64>,
    load_5m: Option<f64>,
    load_10m: Option<f64>,
    pid: u32,
    process: &'a str,
    cpu_usage: f64,
    user_cpu: f64,
    kernel_cpu: f64,
}

impl<'a> From<&'a ProcessSample> for DetailedRow<'a> {
    fn from(s: &'a ProcessSample) -> Self {
        Self {
            loop_id: s.loop_id,
            timestamp: &s.timestamp,
            load_1m: s.load.map(|l| l.one_minute),
            load_5m: s.load.map(|l| l.five_minutes),
            load_10m: s.load.map(|l| l.ten_minutes),
            pid: s.pid,
            process: &s.name,
            cpu_usage: s.cpu.total,
            user_cpu: s.cpu.user,
            kernel_cpu: s.cpu.kernel,
        }
    }
}

/// A loop average cell. Loops without processes write a bare `0`.
#[derive(Serialize)]
#[serde(untagged)]
enum AverageCell {
    Empty(u8),
    Value(f64),
}

impl AverageCell {
    fn new(value: f64, process_count: usize) -> Self {
        if process_count == 0 {
            AverageCell::Empty(0)
        } else {
            AverageCell::Value(value)
        }
    }
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    loop_id: u64,
    timestamp: &'a str,
    load_1m: Option<f64>,
    load_5m: Option<f64>,
    load_10m: Option<f64>,
    avg_cpu_usage: AverageCell,
    avg_user_cpu: AverageCell,
    avg_kernel_cpu: AverageCell,
    process_count: usize,
}

impl<'a> From<&'a LoopSummary> for SummaryRow<'a> {
    fn from(s: &'a LoopSummary) -> Self {
        Self {
            loop_id: s.loop_id,
            timestamp: &s.timestamp,
            load_1m: s.load.map(|l| l.one_minute),
            load_5m: s.load.map(|l| l.five_minutes),
            load_10m: s.load.map(|l| l.ten_minutes),
            avg_cpu_usage: AverageCell::new(s.averages.total, s.process_count),
            avg_user_cpu: AverageCell::new(s.averages.user, s.process_count),
            avg_kernel_cpu: AverageCell::new(s.averages.kernel, s.process_count),
            process_count: s.process_count,
        }
    }
}

#[derive(Serialize)]
struct RankRow {
    rank: usize,
    avg_cpu_usage: f64,
    avg_user_cpu: f64,
    avg_kernel_cpu: f64,
    process_count: usize,
}

impl From<&RankSummary> for RankRow {
    fn from(r: &RankSummary) -> Self {
        Self {
            rank: r.rank,
            avg_cpu_usage: r.averages.total,
            avg_user_cpu: r.averages.user,
            avg_kernel_cpu: r.averages.kernel,
            process_count: r.process_count,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Write one row per sample, in the order given.
pub fn write_detailed(path: &Path, records: &[ProcessSample]) -> Result<()> {
    write_csv(path, &DETAILED_HEADERS, records.iter().map(DetailedRow::from))
}

/// Write one row per loop summary.
pub fn write_loop_summaries(path: &Path, summaries: &[LoopSummary]) -> Result<()> {
    write_csv(path, &SUMMARY_HEADERS, summaries.iter().map(SummaryRow::from))
}

/// Write one row per populated rank.
pub fn write_rank_summaries(path: &Path, ranks: &[RankSummary]) -> Result<()> {
    write_csv(path, &RANK_HEADERS, ranks.iter().map(RankRow::from))
}

/// Serialise `rows` as CSV to any writer, header first.
pub fn write_rows<W, R, I>(out: W, headers: &[&str], rows: I) -> Result<W>
where
    W: Write,
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| {
        let err = e.error();
        ParserError::Io(std::io::Error::new(err.kind(), err.to_string()))
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn write_csv<R, I>(path: &Path, headers: &[&str], rows: I) -> Result<()>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let file = File::create(path).map_err(|source| ParserError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let as_write_error = |source| ParserError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = write_rows(file, headers, rows).map_err(|e| match e {
        ParserError::Io(source) => as_write_error(source),
        other => other,
    })?;
    file.flush().map_err(as_write_error)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
