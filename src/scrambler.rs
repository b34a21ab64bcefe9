/// Scrambling of file names.
///
/// This module renames every matched file in a directory to a random name
/// and records each rename in a scramble log, which `unscramble` later
/// replays in reverse. It also defines the error type shared by the crate.
use crate::config::{ConfigError, ScramblerConfig};
use crate::matcher::{FileMatcher, FilterCriteria, MatchSet, split_extension};
use crate::namer::NameGenerator;
use crate::scramble_log::{LogEntry, ScrambleLogWriter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while scrambling or unscrambling.
#[derive(Debug, Error)]
pub enum ScrambleError {
    /// The target directory is missing or unreadable.
    #[error("Invalid directory {}: {source}", .path.display())]
    InvalidDirectory { path: PathBuf, source: io::Error },
    /// The regex filter does not compile.
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
    /// The scramble log to unscramble from does not exist.
    #[error("Log file not found: {}", .path.display())]
    LogFileMissing { path: PathBuf },
    /// The file is not a scramble log, or one of its entries is malformed.
    #[error("{} does not appear to be a scrambler log: {reason}", .path.display())]
    LogFormatMismatch { path: PathBuf, reason: String },
    /// Failed to read the scramble log.
    #[error("Failed to read log file {}: {source}", .path.display())]
    LogReadFailed { path: PathBuf, source: io::Error },
    /// Failed to create, write or delete the scramble log.
    #[error("Failed to write log file {}: {source}", .path.display())]
    LogWriteFailed { path: PathBuf, source: io::Error },
    /// A single rename failed.
    #[error("Failed to rename {from} to {to}: {source}")]
    RenameFailed {
        from: String,
        to: String,
        source: io::Error,
    },
    /// A name cannot be represented in the log format.
    #[error("Cannot log name {name:?}: {reason}")]
    UnloggableName { name: String, reason: String },
    /// Configuration could not be loaded or compiled.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for scramble and unscramble operations.
pub type ScrambleResult<T> = Result<T, ScrambleError>;

/// Decides what to do when the chosen log name is already taken.
///
/// Returning `None` cancels the scramble before any file is renamed.
pub trait LogNameResolver {
    fn resolve(&mut self, colliding_name: &str) -> Option<String>;
}

impl<F> LogNameResolver for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn resolve(&mut self, colliding_name: &str) -> Option<String> {
        self(colliding_name)
    }
}

/// Resolver that cancels on the first collision.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbortOnCollision;

impl LogNameResolver for AbortOnCollision {
    fn resolve(&mut self, _colliding_name: &str) -> Option<String> {
        None
    }
}

/// What a completed scramble did.
#[derive(Debug)]
pub struct ScrambleReport {
    /// The directory that was scrambled.
    pub directory: PathBuf,
    /// Where the scramble log was written.
    pub log_path: PathBuf,
    /// Every rename that was performed and logged.
    pub renamed: Vec<LogEntry>,
    /// Files that could not be scrambled, with the reason.
    pub failures: Vec<(String, String)>,
}

impl ScrambleReport {
    /// Returns true if every matched file was scrambled.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of a scramble request.
#[derive(Debug)]
pub enum ScrambleOutcome {
    /// The log was written and the matched files were processed.
    Completed(ScrambleReport),
    /// The log name collision was cancelled; nothing was renamed.
    Aborted,
}

/// Renames matched files to random names, recording each rename.
#[derive(Debug, Clone, Default)]
pub struct Scrambler {
    config: ScramblerConfig,
}

impl Scrambler {
    pub fn new(config: ScramblerConfig) -> Self {
        Self { config }
    }

    /// Returns the files `criteria` selects, without touching anything.
    pub fn preview(&self, criteria: &FilterCriteria) -> ScrambleResult<MatchSet> {
        let directory = resolve_directory(&criteria.directory)?;
        self.match_in(&directory, criteria)
    }

    /// Scrambles the files selected by `criteria`.
    ///
    /// # Arguments
    ///
    /// * `criteria` - The directory and filters selecting the files
    /// * `log_name` - Explicit log file name; derived from the directory name if `None`
    /// * `resolver` - Consulted while the log name is already taken
    ///
    /// # Returns
    ///
    /// `ScrambleOutcome::Aborted` if the resolver cancelled, otherwise a report of
    /// what was renamed and what failed. Per-file failures do not stop the run.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use scrambler::matcher::FilterCriteria;
    /// use scrambler::scrambler::{AbortOnCollision, ScrambleOutcome, Scrambler};
    ///
    /// let criteria = FilterCriteria::new("/path/to/essays").with_extensions(["txt"]);
    /// match Scrambler::default().scramble(&criteria, None, &mut AbortOnCollision) {
    ///     Ok(ScrambleOutcome::Completed(report)) => {
    ///         println!("Log written to {}", report.log_path.display())
    ///     }
    ///     Ok(ScrambleOutcome::Aborted) => println!("Scrambling aborted"),
    ///     Err(e) => eprintln!("Scramble failed: {}", e),
    /// }
    /// ```
    pub fn scramble(
        &self,
        criteria: &FilterCriteria,
        log_name: Option<&str>,
        resolver: &mut dyn LogNameResolver,
    ) -> ScrambleResult<ScrambleOutcome> {
        self.scramble_with_progress(criteria, log_name, resolver, &mut |_: &str, _: usize| {})
    }

    /// Like [`Scrambler::scramble`], calling `on_file` after each matched file is
    /// processed with the file's original name and the size of the match set.
    pub fn scramble_with_progress(
        &self,
        criteria: &FilterCriteria,
        log_name: Option<&str>,
        resolver: &mut dyn LogNameResolver,
        on_file: &mut dyn FnMut(&str, usize),
    ) -> ScrambleResult<ScrambleOutcome> {
        let directory = resolve_directory(&criteria.directory)?;
        let files = self.match_in(&directory, criteria)?;

        let initial_name = match log_name {
            Some(name) => name.to_string(),
            None => self.default_log_name(&directory),
        };
        let Some(mut log) = create_log(&directory, initial_name, resolver)? else {
            tracing::info!(directory = %directory.display(), "scramble aborted at log name prompt");
            return Ok(ScrambleOutcome::Aborted);
        };

        let generator = NameGenerator::new(self.config.names.length);
        let mut renamed = Vec::new();
        let mut failures = Vec::new();

        for original in &files {
            let new_name = generator.generate(original);
            match self.scramble_file(&directory, original, &new_name, &mut log) {
                Ok(entry) => renamed.push(entry),
                Err(e @ ScrambleError::LogWriteFailed { .. }) => return Err(e),
                Err(e) => {
                    tracing::debug!(file = %original, error = %e, "could not scramble file");
                    failures.push((original.clone(), e.to_string()));
                }
            }
            on_file(original, files.len());
        }

        let log_path = log.close()?;
        tracing::info!(
            directory = %directory.display(),
            renamed = renamed.len(),
            failed = failures.len(),
            "scramble finished"
        );

        Ok(ScrambleOutcome::Completed(ScrambleReport {
            directory,
            log_path,
            renamed,
            failures,
        }))
    }

    /// Renames one file and logs it. The entry is only written once the
    /// rename has succeeded; if writing fails, the rename is reverted.
    fn scramble_file(
        &self,
        directory: &Path,
        original: &str,
        new_name: &str,
        log: &mut ScrambleLogWriter,
    ) -> ScrambleResult<LogEntry> {
        let entry = LogEntry::new(original, new_name)?;
        rename_in(directory, original, new_name)?;

        if let Err(e) = log.append(&entry) {
            if let Err(revert) = rename_in(directory, new_name, original) {
                tracing::error!(
                    file = %original,
                    scrambled = %new_name,
                    error = %revert,
                    "could not revert unlogged rename"
                );
            }
            return Err(e);
        }

        tracing::debug!(from = %original, to = %new_name, "scrambled");
        Ok(entry)
    }

    fn match_in(&self, directory: &Path, criteria: &FilterCriteria) -> ScrambleResult<MatchSet> {
        let exclusions = self.config.compile_exclusions()?;
        let criteria = FilterCriteria {
            directory: directory.to_path_buf(),
            ..criteria.clone()
        };
        FileMatcher::new(&criteria, exclusions)?.matches()
    }

    /// The log name used when none is given: the directory's own name plus the
    /// configured suffix, e.g. `essays_scramble.log`.
    pub fn default_log_name(&self, directory: &Path) -> String {
        let dir_name = directory
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "root".to_string());
        format!("{}{}", dir_name, self.config.names.log_suffix)
    }
}

/// Canonicalizes the target directory, failing if it is not a readable directory.
fn resolve_directory(directory: &Path) -> ScrambleResult<PathBuf> {
    let canonical =
        fs::canonicalize(directory).map_err(|source| ScrambleError::InvalidDirectory {
            path: directory.to_path_buf(),
            source,
        })?;
    if !canonical.is_dir() {
        return Err(ScrambleError::InvalidDirectory {
            path: directory.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        });
    }
    Ok(canonical)
}

/// Creates the log in `directory`, asking `resolver` for another name while
/// the current one is taken. Returns `None` if the resolver cancels.
fn create_log(
    directory: &Path,
    mut log_name: String,
    resolver: &mut dyn LogNameResolver,
) -> ScrambleResult<Option<ScrambleLogWriter>> {
    loop {
        let path = directory.join(&log_name);
        if let Some(log) = ScrambleLogWriter::create(&path)? {
            return Ok(Some(log));
        }

        tracing::debug!(name = %log_name, "log name already exists");
        let Some(replacement) = resolver.resolve(&log_name) else {
            return Ok(None);
        };
        let replacement = replacement.trim();
        if replacement.is_empty() {
            return Ok(None);
        }
        log_name = format!("{}.log", split_extension(replacement).0);
    }
}

/// Renames `from` to `to` inside `directory`, refusing to overwrite.
pub(crate) fn rename_in(directory: &Path, from: &str, to: &str) -> ScrambleResult<()> {
    let source = directory.join(from);
    let destination = directory.join(to);
    let fail = |source: io::Error| ScrambleError::RenameFailed {
        from: from.to_string(),
        to: to.to_string(),
        source,
    };

    if !source.is_file() {
        return Err(fail(io::Error::new(
            io::ErrorKind::NotFound,
            "file not found",
        )));
    }
    if destination.exists() {
        return Err(fail(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        )));
    }

    fs::rename(&source, &destination).map_err(fail)
}
