//! The scramble log: the only record of which random name belongs to which file.
//!
//! The format is plain text, one rename per line, after a fixed header line:
//!
//! ```text
//! Scrambler.py Log
//! essay_alice.txt --> 4K9QZ0TB.txt
//! essay_bob.txt --> P1M3XWQ8.txt
//! ```
//!
//! Names cannot contain the separator or a line break; such names are
//! rejected before anything is written.

use crate::scrambler::{ScrambleError, ScrambleResult};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// First line of every scramble log.
pub const LOG_HEADER: &str = "Scrambler.py Log";

/// Token between the original and the new name on each entry line.
pub const ENTRY_SEPARATOR: &str = " --> ";

/// One recorded rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// The file name before scrambling.
    pub original_name: String,
    /// The random name the file was given.
    pub new_name: String,
}

impl LogEntry {
    /// Creates an entry, rejecting names the log format cannot represent.
    pub fn new(original_name: impl Into<String>, new_name: impl Into<String>) -> ScrambleResult<Self> {
        let entry = Self {
            original_name: original_name.into(),
            new_name: new_name.into(),
        };
        check_loggable(&entry.original_name)?;
        check_loggable(&entry.new_name)?;
        Ok(entry)
    }

    /// Renders the entry as a log line, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{}{}{}", self.original_name, ENTRY_SEPARATOR, self.new_name)
    }

    /// Parses a log line. The line is split on the first separator.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (original, new) = line.split_once(ENTRY_SEPARATOR)?;
        if original.is_empty() || new.is_empty() {
            return None;
        }
        Some(Self {
            original_name: original.to_string(),
            new_name: new.to_string(),
        })
    }
}

/// Checks that `name` can be written to a log line and read back unchanged.
pub fn check_loggable(name: &str) -> ScrambleResult<()> {
    let reason = if name.contains(ENTRY_SEPARATOR) {
        "name contains the log separator"
    } else if name.contains(['\n', '\r']) {
        "name contains a line break"
    } else {
        return Ok(());
    };
    Err(ScrambleError::UnloggableName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Append-only writer for a scramble log being created.
#[derive(Debug)]
pub struct ScrambleLogWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    entries: usize,
}

impl ScrambleLogWriter {
    /// Creates the log at `path` and writes the header.
    ///
    /// The file must not exist yet. `Ok(None)` is returned when it does, so
    /// the caller can pick another name.
    pub fn create(path: &Path) -> ScrambleResult<Option<Self>> {
        let file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(source) => {
                return Err(ScrambleError::LogWriteFailed {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut log = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            entries: 0,
        };
        log.write_line(LOG_HEADER)?;
        tracing::info!(path = %path.display(), "created scramble log");
        Ok(Some(log))
    }

    /// Appends one entry and flushes it to disk.
    pub fn append(&mut self, entry: &LogEntry) -> ScrambleResult<()> {
        self.write_line(&entry.to_line())?;
        self.entries += 1;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> ScrambleResult<()> {
        writeln!(self.writer, "{}", line)
            .and_then(|()| self.writer.flush())
            .map_err(|source| ScrambleError::LogWriteFailed {
                path: self.path.clone(),
                source,
            })
    }

    /// Flushes and closes the log, returning its path.
    pub fn close(mut self) -> ScrambleResult<PathBuf> {
        self.writer
            .flush()
            .map_err(|source| ScrambleError::LogWriteFailed {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), entries = self.entries, "closed scramble log");
        Ok(self.path)
    }
}

/// Parses the full text of a scramble log.
///
/// The first line must equal [`LOG_HEADER`] exactly. Blank lines are
/// ignored; any other line without the separator rejects the whole log.
pub fn parse_log(path: &Path, content: &str) -> ScrambleResult<Vec<LogEntry>> {
    let mut lines = content.lines();
    if lines.next() != Some(LOG_HEADER) {
        return Err(ScrambleError::LogFormatMismatch {
            path: path.to_path_buf(),
            reason: "missing scrambler log header".to_string(),
        });
    }

    lines
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            LogEntry::parse_line(line).ok_or_else(|| ScrambleError::LogFormatMismatch {
                path: path.to_path_buf(),
                reason: format!("malformed entry on line {}: {:?}", index + 2, line),
            })
        })
        .collect()
}

/// Reads and parses the scramble log at `path`.
pub fn read_log(path: &Path) -> ScrambleResult<Vec<LogEntry>> {
    if !path.is_file() {
        return Err(ScrambleError::LogFileMissing {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| ScrambleError::LogReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    parse_log(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_line_format() {
        let entry = LogEntry::new("file1.txt", "AB12CD34.txt").unwrap();
        assert_eq!(entry.to_line(), "file1.txt --> AB12CD34.txt");
    }

    #[test]
    fn test_parse_line() {
        let entry = LogEntry::parse_line("my notes.txt --> ZZZZ0000.txt").unwrap();
        assert_eq!(entry.original_name, "my notes.txt");
        assert_eq!(entry.new_name, "ZZZZ0000.txt");

        assert!(LogEntry::parse_line("no separator here").is_none());
        assert!(LogEntry::parse_line(" --> X.txt").is_none());
    }

    #[test]
    fn test_unloggable_names_rejected() {
        assert!(matches!(
            LogEntry::new("a --> b.txt", "X.txt"),
            Err(ScrambleError::UnloggableName { .. })
        ));
        assert!(matches!(
            LogEntry::new("line\nbreak.txt", "X.txt"),
            Err(ScrambleError::UnloggableName { .. })
        ));
        assert!(check_loggable("a->b.txt").is_ok());
    }

    #[test]
    fn test_writer_produces_expected_text() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test_scramble.log");

        let mut writer = ScrambleLogWriter::create(&path).unwrap().unwrap();
        writer
            .append(&LogEntry::new("file1.txt", "AAAAAAAA.txt").unwrap())
            .unwrap();
        writer
            .append(&LogEntry::new("file2.txt", "BBBBBBBB.txt").unwrap())
            .unwrap();
        assert_eq!(writer.close().unwrap(), path);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Scrambler.py Log\nfile1.txt --> AAAAAAAA.txt\nfile2.txt --> BBBBBBBB.txt\n"
        );
    }

    #[test]
    fn test_writer_refuses_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("taken.log");
        fs::write(&path, "keep me").unwrap();

        assert!(ScrambleLogWriter::create(&path).unwrap().is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn test_parse_log_requires_header() {
        let path = Path::new("x.log");
        let result = parse_log(path, "Some Other Log\na.txt --> B.txt\n");
        assert!(matches!(result, Err(ScrambleError::LogFormatMismatch { .. })));

        let result = parse_log(path, "");
        assert!(matches!(result, Err(ScrambleError::LogFormatMismatch { .. })));
    }

    #[test]
    fn test_parse_log_skips_blank_lines_and_handles_crlf() {
        let entries = parse_log(
            Path::new("x.log"),
            "Scrambler.py Log\r\na.txt --> B.txt\r\n\r\nc.txt --> D.txt\n",
        )
        .unwrap();

        assert_eq!(
            entries,
            vec![
                LogEntry::new("a.txt", "B.txt").unwrap(),
                LogEntry::new("c.txt", "D.txt").unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_log_rejects_malformed_entry() {
        let result = parse_log(Path::new("x.log"), "Scrambler.py Log\na.txt -> B.txt\n");
        assert!(matches!(result, Err(ScrambleError::LogFormatMismatch { .. })));
    }

    #[test]
    fn test_read_missing_log() {
        let result = read_log(Path::new("/non/existent/file.log"));
        assert!(matches!(result, Err(ScrambleError::LogFileMissing { .. })));
    }
}
