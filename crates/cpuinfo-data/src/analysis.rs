//! Main analysis pipeline for the cpuinfo log parser.
//!
//! Runs the single parsing pass, turns the rank accumulator into rank rows,
//! writes the three CSV files and, on request, a JSON run report.

use std::path::Path;

use chrono::Utc;
use cpuinfo_core::models::{LoopSummary, ParseStats, ProcessSample, RankSummary};
use cpuinfo_core::settings::{OutputPaths, Settings};
use cpuinfo_core::{ParserError, Result};
use serde::Serialize;
use tracing::info;

use crate::parser::LoopParser;
use crate::reader::{read_log, split_lines};
use crate::writer::{write_detailed, write_loop_summaries, write_rank_summaries};

// ── Public types ──────────────────────────────────────────────────────────────

/// The complete output of [`analyze_log`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Detailed records, busiest first within each loop.
    pub records: Vec<ProcessSample>,
    /// One row per loop in encounter order.
    pub loop_summaries: Vec<LoopSummary>,
    /// One row per populated rank, ascending.
    pub rank_summaries: Vec<RankSummary>,
    pub stats: ParseStats,
}

/// Metadata written by `--report`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    pub input: String,
    pub detailed_output: String,
    pub summary_output: String,
    pub global_summary_output: String,
    /// Number of rank rows written.
    pub ranks: usize,
    pub stats: ParseStats,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Parse the whole log `content` in one pass. `\n`, `\r\n` and a lone `\r`
/// all end a line.
///
/// Fails only on a numerically invalid field or, with `strict`, an orphan
/// line; unrecognised lines are skipped.
pub fn analyze_log(content: &str, strict: bool) -> Result<AnalysisResult> {
    let mut parser = LoopParser::new(strict);
    for line in split_lines(content) {
        parser.feed_line(line)?;
    }
    let parsed = parser.finish();

    Ok(AnalysisResult {
        records: parsed.records,
        loop_summaries: parsed.loop_summaries,
        rank_summaries: parsed.ranks.into_rank_summaries(),
        stats: parsed.stats,
    })
}

/// Write the three CSV outputs, one file after another.
///
/// A failure part-way leaves earlier files complete and the failing one
/// possibly truncated.
pub fn write_outputs(result: &AnalysisResult, paths: &OutputPaths) -> Result<()> {
    info!("Writing parsed process data to {}", paths.detailed.display());
    write_detailed(&paths.detailed, &result.records)?;
    info!("Process data written successfully.");

    info!("Writing summary data to {}", paths.summary.display());
    write_loop_summaries(&paths.summary, &result.loop_summaries)?;
    info!("Summary data written successfully.");

    info!(
        "Writing global rank-based averages to {}",
        paths.global_summary.display()
    );
    write_rank_summaries(&paths.global_summary, &result.rank_summaries)?;
    info!("Global ranking summary written successfully.");

    Ok(())
}

/// Read `settings.input`, analyse it and write every requested output.
pub fn run(settings: &Settings) -> Result<RunReport> {
    let content = read_log(&settings.input)?;
    let result = analyze_log(&content, settings.strict)?;
    let paths = settings.output_paths();
    write_outputs(&result, &paths)?;

    let report = RunReport {
        generated_at: Utc::now().to_rfc3339(),
        input: settings.input.display().to_string(),
        detailed_output: paths.detailed.display().to_string(),
        summary_output: paths.summary.display().to_string(),
        global_summary_output: paths.global_summary.display().to_string(),
        ranks: result.rank_summaries.len(),
        stats: result.stats,
    };

    if let Some(report_path) = &settings.report {
        write_report(report_path, &report)?;
    }

    Ok(report)
}

/// Write `report` as pretty-printed JSON.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    info!("Writing run report to {}", path.display());
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|source| ParserError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
