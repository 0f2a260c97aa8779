//! Line classification for `dumpsys cpuinfo` loop logs.
//!
//! Every stripped input line is one of four kinds: a loop boundary, a load
//! line, a process line, or something else. Matching is isolated here so the
//! loop state machine never touches a regex.

use cpuinfo_core::models::{CpuUsage, LoadAverages};
use cpuinfo_core::{ParserError, Result};
use regex::{Captures, Regex};

const LOOP_PATTERN: &str = r"=== Loop:(\d+), Cmd:dumpsys cpuinfo, Date:(.*)";
const LOAD_PATTERN: &str = r"Load:\s+([0-9.]+)\s+/\s+([0-9.]+)\s+/\s+([0-9.]+)";
const PROCESS_PATTERN: &str = r"(?P<cpu_usage>[0-9.]+)%\s+(?P<pid>\d+)/(?P<process>\S+):\s+(?P<user_cpu>[0-9.]+)% user \+ (?P<kernel_cpu>[0-9.]+)% kernel";

// ── LineKind ──────────────────────────────────────────────────────────────────

/// The fields extracted from one process line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessLine<'a> {
    pub pid: u32,
    pub name: &'a str,
    pub cpu: CpuUsage,
}

/// The result of classifying a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// `=== Loop:<n>, Cmd:dumpsys cpuinfo, Date:<free text>`
    LoopBoundary { loop_id: u64, timestamp: &'a str },
    /// `Load: <1m> / <5m> / <10m>`
    Load(LoadAverages),
    /// `<cpu>% <pid>/<name>: <user>% user + <kernel>% kernel`
    Process(ProcessLine<'a>),
    Unrecognized,
}

// ── LineClassifier ────────────────────────────────────────────────────────────

/// Holds the compiled line grammars.
pub struct LineClassifier {
    loop_re: Regex,
    load_re: Regex,
    process_re: Regex,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            loop_re: Regex::new(LOOP_PATTERN).expect("regex is valid"),
            load_re: Regex::new(LOAD_PATTERN).expect("regex is valid"),
            process_re: Regex::new(PROCESS_PATTERN).expect("regex is valid"),
        }
    }

    /// Classify an already stripped `line`.
    ///
    /// Grammars are tried in order boundary, load, process; the first match
    /// wins. `line_no` (1-based) is only used in error messages: a line that
    /// matches a grammar but carries an unparseable number is an error, never
    /// a silent skip.
    pub fn classify<'a>(&self, line: &'a str, line_no: usize) -> Result<LineKind<'a>> {
        if let Some(cap) = self.loop_re.captures(line) {
            let loop_id = parse_field(&cap, 1, "loop counter", line_no)?;
            let timestamp = cap.get(2).map_or("", |m| m.as_str());
            return Ok(LineKind::LoopBoundary { loop_id, timestamp });
        }

        if let Some(cap) = self.load_re.captures(line) {
            return Ok(LineKind::Load(LoadAverages {
                one_minute: parse_field(&cap, 1, "1m load", line_no)?,
                five_minutes: parse_field(&cap, 2, "5m load", line_no)?,
                ten_minutes: parse_field(&cap, 3, "10m load", line_no)?,
            }));
        }

        if let Some(cap) = self.process_re.captures(line) {
            let name = cap.name("process").map_or("", |m| m.as_str());
            return Ok(LineKind::Process(ProcessLine {
                pid: parse_named(&cap, "pid", "pid", line_no)?,
                name,
                cpu: CpuUsage {
                    total: parse_named(&cap, "cpu_usage", "CPU usage", line_no)?,
                    user: parse_named(&cap, "user_cpu", "user CPU", line_no)?,
                    kernel: parse_named(&cap, "kernel_cpu", "kernel CPU", line_no)?,
                },
            }));
        }

        Ok(LineKind::Unrecognized)
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn parse_field<T: std::str::FromStr>(
    cap: &Captures<'_>,
    index: usize,
    field: &'static str,
    line_no: usize,
) -> Result<T> {
    let raw = cap.get(index).map_or("", |m| m.as_str());
    parse_number(raw, field, line_no)
}

fn parse_named<T: std::str::FromStr>(
    cap: &Captures<'_>,
    name: &str,
    field: &'static str,
    line_no: usize,
) -> Result<T> {
    let raw = cap.name(name).map_or("", |m| m.as_str());
    parse_number(raw, field, line_no)
}

fn parse_number<T: std::str::FromStr>(raw: &str, field: &'static str, line_no: usize) -> Result<T> {
    raw.parse::<T>().map_err(|_| ParserError::InvalidNumber {
        line_no,
        field,
        value: raw.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
