//! Input loading for cpuinfo loop logs.

use std::path::Path;

use cpuinfo_core::{ParserError, Result};
use tracing::info;

/// Read the whole log at `path` into memory.
///
/// A missing, unreadable or non-UTF-8 file is a [`ParserError::FileRead`].
pub fn read_log(path: &Path) -> Result<String> {
    info!("Processing file: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ParserError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    info!("File read successfully.");
    Ok(content)
}

/// Split `content` into lines, treating `\r\n`, `\n` and a lone `\r` each as
/// one line break. A trailing break does not yield an empty final line.
pub fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(|c: char| c == '\n' || c == '\r') {
            Some(i) => {
                let line = &rest[..i];
                let skip = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[i + skip..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_log_returns_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let content = read_log(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_split_lines_mixed_breaks() {
        let lines: Vec<&str> = split_lines("a\r\nb\rc\n\nd").collect();
        assert_eq!(lines, vec!["a", "b", "c", "", "d"]);
    }

    #[test]
    fn test_split_lines_trailing_break() {
        assert_eq!(split_lines("a\r").collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(split_lines("a\r\n").collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(split_lines("").count(), 0);
    }

    #[test]
    fn test_read_log_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");

        let err = read_log(&path).unwrap_err();
        match err {
            ParserError::FileRead { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_log_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(read_log(&path), Err(ParserError::FileRead { .. })));
    }
}
