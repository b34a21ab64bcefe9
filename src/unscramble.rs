/// Unscrambling: restoring original names from a scramble log.
///
/// Every entry of the log is reversed by renaming the random name back to
/// the original one. The log is deleted once all entries are restored.
use crate::scramble_log::{LogEntry, read_log};
use crate::scrambler::{ScrambleError, ScrambleResult, rename_in};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Represents the result of an unscramble operation.
#[derive(Debug)]
pub struct UnscrambleReport {
    /// The scramble log that was replayed.
    pub log_path: PathBuf,
    /// Entries whose original name was restored.
    pub restored: Vec<LogEntry>,
    /// Entries whose scrambled file could not be found, with the reason.
    pub skipped_files: Vec<(String, String)>,
    /// Entries that failed to restore for any other reason.
    pub failed_restores: Vec<(String, String)>,
    /// Whether the log was removed after a complete restore.
    pub log_deleted: bool,
}

impl UnscrambleReport {
    fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            restored: Vec::new(),
            skipped_files: Vec::new(),
            failed_restores: Vec::new(),
            log_deleted: false,
        }
    }

    /// Number of files restored.
    pub fn restored_files(&self) -> usize {
        self.restored.len()
    }

    /// Returns the total number of entries processed.
    pub fn total_processed(&self) -> usize {
        self.restored.len() + self.failed_restores.len() + self.skipped_files.len()
    }

    /// Returns true if every entry was restored.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

/// Replays scramble logs in reverse.
pub struct Unscrambler;

impl Unscrambler {
    /// Restores the original names recorded in the log at `log_path`.
    ///
    /// The log's own directory is the directory whose files are renamed.
    /// Every entry is attempted even when an earlier one fails; the log is
    /// only deleted if all of them succeed.
    ///
    /// # Errors
    ///
    /// * `LogFileMissing` if there is no file at `log_path`
    /// * `LogFormatMismatch` if the header is wrong or an entry is malformed;
    ///   nothing is renamed in that case
    /// * `LogReadFailed` if the log cannot be read
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use scrambler::unscramble::Unscrambler;
    /// use std::path::Path;
    ///
    /// match Unscrambler::unscramble(Path::new("/path/to/essays/essays_scramble.log")) {
    ///     Ok(report) => println!("Restored {} files", report.restored_files()),
    ///     Err(e) => eprintln!("Unscramble failed: {}", e),
    /// }
    /// ```
    pub fn unscramble(log_path: &Path) -> ScrambleResult<UnscrambleReport> {
        let (directory, log_name) = split_log_path(log_path)?;
        let log_path = directory.join(log_name);
        let entries = read_log(&log_path)?;
        tracing::info!(
            path = %log_path.display(),
            entries = entries.len(),
            "unscrambling"
        );

        let mut report = UnscrambleReport::new(log_path);
        for entry in entries.into_iter().rev() {
            match rename_in(&directory, &entry.new_name, &entry.original_name) {
                Ok(()) => {
                    tracing::debug!(from = %entry.new_name, to = %entry.original_name, "restored");
                    report.restored.push(entry);
                }
                Err(ScrambleError::RenameFailed { source, .. })
                    if source.kind() == ErrorKind::NotFound =>
                {
                    tracing::debug!(file = %entry.new_name, "scrambled file not found");
                    report
                        .skipped_files
                        .push((entry.new_name, format!("File not found: {}", source)));
                }
                Err(e) => {
                    tracing::debug!(file = %entry.new_name, error = %e, "could not restore file");
                    report.failed_restores.push((entry.new_name, e.to_string()));
                }
            }
        }

        if report.is_complete_success() {
            match fs::remove_file(&report.log_path) {
                Ok(()) => report.log_deleted = true,
                Err(e) => {
                    tracing::debug!(path = %report.log_path.display(), error = %e, "could not delete log")
                }
            }
        }

        Ok(report)
    }
}

/// Splits a log path into its directory and file name. A bare file name
/// refers to the current directory.
fn split_log_path(log_path: &Path) -> ScrambleResult<(PathBuf, &std::ffi::OsStr)> {
    let log_name = log_path
        .file_name()
        .ok_or_else(|| ScrambleError::LogFileMissing {
            path: log_path.to_path_buf(),
        })?;
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, log_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scramble_log::{LOG_HEADER, LogEntry, ScrambleLogWriter};
    use std::fs;
    use tempfile::TempDir;

    fn write_log(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ScrambleLogWriter::create(path).unwrap().unwrap();
        for (original, new) in entries {
            writer.append(&LogEntry::new(*original, *new).unwrap()).unwrap();
        }
        writer.close().unwrap();
    }

    #[test]
    fn test_unscramble_missing_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = Unscrambler::unscramble(&temp_dir.path().join("nothing.log"));

        assert!(matches!(result, Err(ScrambleError::LogFileMissing { .. })));
    }

    #[test]
    fn test_unscramble_restores_and_deletes_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("AAAA1111.txt"), "alice").unwrap();
        fs::write(base_path.join("BBBB2222.md"), "bob").unwrap();
        let log_path = base_path.join("run.log");
        write_log(
            &log_path,
            &[("alice.txt", "AAAA1111.txt"), ("bob.md", "BBBB2222.md")],
        );

        let report = Unscrambler::unscramble(&log_path).expect("Unscramble failed");

        assert_eq!(report.restored_files(), 2);
        assert!(report.is_complete_success());
        assert!(report.log_deleted);
        assert_eq!(fs::read_to_string(base_path.join("alice.txt")).unwrap(), "alice");
        assert_eq!(fs::read_to_string(base_path.join("bob.md")).unwrap(), "bob");
        assert!(!log_path.exists());
    }

    #[test]
    fn test_wrong_header_renames_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("AAAA1111.txt"), "alice").unwrap();
        let log_path = base_path.join("fake.log");
        fs::write(&log_path, "Not A Scrambler Log\nalice.txt --> AAAA1111.txt\n").unwrap();

        let result = Unscrambler::unscramble(&log_path);

        assert!(matches!(result, Err(ScrambleError::LogFormatMismatch { .. })));
        assert!(base_path.join("AAAA1111.txt").exists());
        assert!(!base_path.join("alice.txt").exists());
        assert!(log_path.exists());
    }

    #[test]
    fn test_missing_scrambled_file_is_skipped_and_log_kept() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("AAAA1111.txt"), "alice").unwrap();
        let log_path = base_path.join("run.log");
        write_log(
            &log_path,
            &[("alice.txt", "AAAA1111.txt"), ("gone.txt", "ZZZZ9999.txt")],
        );

        let report = Unscrambler::unscramble(&log_path).expect("Unscramble failed");

        assert_eq!(report.restored_files(), 1);
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(report.skipped_files[0].0, "ZZZZ9999.txt");
        assert_eq!(report.total_processed(), 2);
        assert!(!report.log_deleted);
        assert!(log_path.exists());
        assert!(base_path.join("alice.txt").exists());
    }

    #[test]
    fn test_existing_original_is_not_overwritten() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("AAAA1111.txt"), "scrambled").unwrap();
        fs::write(base_path.join("alice.txt"), "newer").unwrap();
        let log_path = base_path.join("run.log");
        write_log(&log_path, &[("alice.txt", "AAAA1111.txt")]);

        let report = Unscrambler::unscramble(&log_path).expect("Unscramble failed");

        assert_eq!(report.failed_restores.len(), 1);
        assert!(!report.is_complete_success());
        assert_eq!(fs::read_to_string(base_path.join("alice.txt")).unwrap(), "newer");
        assert!(base_path.join("AAAA1111.txt").exists());
        assert!(log_path.exists());
    }

    #[test]
    fn test_header_only_log_is_consumed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log_path = temp_dir.path().join("empty.log");
        fs::write(&log_path, format!("{}\n", LOG_HEADER)).unwrap();

        let report = Unscrambler::unscramble(&log_path).expect("Unscramble failed");

        assert_eq!(report.total_processed(), 0);
        assert!(report.log_deleted);
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("run.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "run.log");

        let (dir, name) = split_log_path(Path::new("/data/essays/run.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/data/essays"));
        assert_eq!(name, "run.log");

        assert!(split_log_path(Path::new("/")).is_err());
    }
}
