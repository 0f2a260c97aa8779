use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Parse a `dumpsys cpuinfo` loop log into per-process, per-loop and per-rank CSV files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cpuinfo-parser",
    about = "Parse a dumpsys cpuinfo loop log into CSV reports",
    version
)]
pub struct Settings {
    /// Input log file
    #[arg(long, short = 'i', default_value = "data.txt")]
    pub input: PathBuf,

    /// Detailed per-process CSV output
    #[arg(long, short = 'o', default_value = "parsed.csv")]
    pub output: PathBuf,

    /// Per-loop summary CSV output
    #[arg(long, default_value = "summary.csv")]
    pub summary: PathBuf,

    /// Global rank summary CSV output
    #[arg(long, default_value = "global_summary.csv")]
    pub global_summary: PathBuf,

    /// Optional JSON run report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Fail on load or process lines that appear before the first loop boundary
    #[arg(long)]
    pub strict: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// The three CSV destinations written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub detailed: PathBuf,
    pub summary: PathBuf,
    pub global_summary: PathBuf,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process command line.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Self {
        let mut settings = Settings::parse_from(args);

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// Bundle the three CSV destinations.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            detailed: self.output.clone(),
            summary: self.summary.clone(),
            global_summary: self.global_summary.clone(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("cpuinfo-parser")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from_args(args(&[]));
        assert_eq!(settings.input, PathBuf::from("data.txt"));
        assert_eq!(settings.output, PathBuf::from("parsed.csv"));
        assert_eq!(settings.summary, PathBuf::from("summary.csv"));
        assert_eq!(settings.global_summary, PathBuf::from("global_summary.csv"));
        assert!(settings.report.is_none());
        assert!(!settings.strict);
        assert_eq!(settings.log_level, "INFO");
    }

    #[test]
    fn test_explicit_paths() {
        let settings = Settings::load_from_args(args(&[
            "--input",
            "/logs/cpu.txt",
            "-o",
            "/out/a.csv",
            "--summary",
            "/out/b.csv",
            "--global-summary",
            "/out/c.csv",
            "--report",
            "/out/report.json",
        ]));
        assert_eq!(settings.input, PathBuf::from("/logs/cpu.txt"));
        assert_eq!(
            settings.output_paths(),
            OutputPaths {
                detailed: PathBuf::from("/out/a.csv"),
                summary: PathBuf::from("/out/b.csv"),
                global_summary: PathBuf::from("/out/c.csv"),
            }
        );
        assert_eq!(settings.report, Some(PathBuf::from("/out/report.json")));
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = Settings::load_from_args(args(&["--log-level", "ERROR", "--debug"]));
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_strict_flag() {
        let settings = Settings::load_from_args(args(&["--strict"]));
        assert!(settings.strict);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = Settings::try_parse_from(args(&["--log-level", "VERBOSE"]));
        assert!(result.is_err());
    }
}
