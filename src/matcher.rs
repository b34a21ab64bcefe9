//! Selection of the files eligible for scrambling.
//!
//! Three filter categories are available: extension, substring and regex.
//! Each category is vacuously true when unset. Categories combine with a
//! logical AND; substrings within their category combine with a logical OR.

use crate::config::CompiledExclusions;
use crate::scrambler::{ScrambleError, ScrambleResult};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The set of file names selected for scrambling.
pub type MatchSet = BTreeSet<String>;

/// The user's filter selection for a single matching call.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Directory whose files are considered.
    pub directory: PathBuf,
    /// Extensions to keep, with or without the leading dot.
    pub extensions: Vec<String>,
    /// Substrings, any of which must occur in the base name.
    pub substrings: Vec<String>,
    /// Pattern that must match at the start of the file name.
    pub regex: Option<String>,
}

impl FilterCriteria {
    /// Creates criteria for `directory` with every filter category unset.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_substrings<I, S>(mut self, substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.substrings = substrings.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }
}

/// Compiled filters, ready to be applied to a directory listing.
#[derive(Debug)]
pub struct FileMatcher {
    directory: PathBuf,
    extensions: HashSet<String>,
    substrings: Vec<String>,
    regex: Option<Regex>,
    exclusions: CompiledExclusions,
}

impl FileMatcher {
    /// Compiles `criteria` against the given exclusion rules.
    ///
    /// # Errors
    ///
    /// Returns `ScrambleError::InvalidRegex` if the regex filter does not compile.
    pub fn new(criteria: &FilterCriteria, exclusions: CompiledExclusions) -> ScrambleResult<Self> {
        let regex = criteria
            .regex
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ScrambleError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            directory: criteria.directory.clone(),
            extensions: criteria
                .extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            substrings: criteria.substrings.clone(),
            regex,
            exclusions,
        })
    }

    /// Lists the directory and returns the files satisfying every active filter.
    ///
    /// Subdirectories, hidden files and files with reserved extensions are
    /// never returned. Names that are not valid UTF-8 are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ScrambleError::InvalidDirectory` if the directory cannot be read.
    pub fn matches(&self) -> ScrambleResult<MatchSet> {
        let entries =
            fs::read_dir(&self.directory).map_err(|source| ScrambleError::InvalidDirectory {
                path: self.directory.clone(),
                source,
            })?;

        let mut matched = MatchSet::new();
        for entry in readable_entries(&self.directory, entries) {
            // Follows symlinks: a link to a regular file is a candidate.
            if !entry.path().is_file() {
                continue;
            }

            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };

            if self.exclusions.is_excluded(&name) {
                tracing::debug!(%name, "excluded");
                continue;
            }

            if self.is_match(&name) {
                matched.insert(name);
            }
        }

        tracing::debug!(
            directory = %self.directory.display(),
            count = matched.len(),
            "matched files"
        );
        Ok(matched)
    }

    /// Applies the three filter categories to a single candidate name.
    pub fn is_match(&self, name: &str) -> bool {
        self.matches_extension(name) && self.matches_substring(name) && self.matches_regex(name)
    }

    fn matches_extension(&self, name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let (_, extension) = split_extension(name);
        self.extensions.contains(extension)
    }

    fn matches_substring(&self, name: &str) -> bool {
        if self.substrings.is_empty() {
            return true;
        }
        let (base, _) = split_extension(name);
        self.substrings
            .iter()
            .any(|substring| base.contains(substring.as_str()))
    }

    fn matches_regex(&self, name: &str) -> bool {
        match &self.regex {
            // Leftmost match starts at 0 iff some match starts at 0.
            Some(regex) => regex.find(name).is_some_and(|m| m.start() == 0),
            None => true,
        }
    }
}

/// Returns the files in `criteria.directory` matching every active filter,
/// using the default exclusion rules.
///
/// # Examples
///
/// ```no_run
/// use scrambler::matcher::{FilterCriteria, match_files};
///
/// let criteria = FilterCriteria::new("/path/to/essays")
///     .with_extensions(["txt"])
///     .with_substrings(["draft", "final"]);
/// let files = match_files(&criteria).expect("directory should be readable");
/// for name in &files {
///     println!("{}", name);
/// }
/// ```
pub fn match_files(criteria: &FilterCriteria) -> ScrambleResult<MatchSet> {
    FileMatcher::new(criteria, CompiledExclusions::default())?.matches()
}

/// Yields the entries that could be read, warning about the rest.
fn readable_entries<T>(
    directory: &Path,
    entries: impl IntoIterator<Item = io::Result<T>>,
) -> impl Iterator<Item = T> {
    entries.into_iter().filter_map(move |entry| match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!(
                directory = %directory.display(),
                error = %e,
                "skipping unreadable directory entry"
            );
            None
        }
    })
}

/// Prefixes an extension filter with `.` unless it already has one.
pub fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

/// Splits a file name into base name and extension.
///
/// The extension starts at the last `.` and keeps it. Leading dots do not
/// start an extension, so `.bashrc` has none.
///
/// ```
/// use scrambler::matcher::split_extension;
///
/// assert_eq!(split_extension("file01.java"), ("file01", ".java"));
/// assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
/// assert_eq!(split_extension("README"), ("README", ""));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// ```
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if !name[..index].chars().all(|c| c == '.') => name.split_at(index),
        _ => (name, ""),
    }
}
