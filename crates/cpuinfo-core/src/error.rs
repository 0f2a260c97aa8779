use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the cpuinfo log parser.
#[derive(Error, Debug)]
pub enum ParserError {
    /// The input log could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line matched a known grammar but one of its numbers did not parse.
    #[error("Invalid {field} '{value}' on line {line_no}")]
    InvalidNumber {
        line_no: usize,
        field: &'static str,
        value: String,
    },

    /// A load or process line appeared before any loop boundary (strict mode only).
    #[error("{kind} line {line_no} appears before any loop boundary")]
    OrphanLine { line_no: usize, kind: &'static str },

    /// A CSV record could not be serialised or flushed.
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be produced.
    #[error("Failed to serialise JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the parser crates.
pub type Result<T> = std::result::Result<T, ParserError>;
