//! Command-line interface module for scrambler.
//!
//! This module handles all CLI-related functionality including:
//! - Command dispatch
//! - Configuration loading
//! - The interactive log name prompt
//! - Reporting scramble and unscramble results

use crate::config::ScramblerConfig;
use crate::matcher::FilterCriteria;
use crate::output::OutputFormatter;
use crate::scrambler::{LogNameResolver, ScrambleOutcome, Scrambler};
use crate::unscramble::Unscrambler;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Represents a CLI command to execute.
#[derive(Debug, Clone)]
pub enum ScrambleCommand {
    /// Scramble the files selected by `criteria`.
    Scramble {
        /// Directory and filters.
        criteria: FilterCriteria,
        /// Explicit log file name.
        log_name: Option<String>,
        /// If true, only list the files that would be scrambled.
        dry_run: bool,
    },
    /// Restore names from a scramble log.
    Unscramble {
        /// Path to the scramble log.
        log_path: PathBuf,
    },
}

/// Asks for a new log name on a line-based terminal.
///
/// An empty answer, or end of input, cancels.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt reading from stdin and writing to stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, colliding_name: &str) -> io::Result<Option<String>> {
        writeln!(self.output, "The logname \"{}\" already exists.", colliding_name)?;
        write!(self.output, "Enter a new name? (Leave blank to abort) ")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(None);
        }
        let answer = answer.trim();
        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(answer.to_string()))
        }
    }
}

impl<R: BufRead, W: Write> LogNameResolver for LinePrompt<R, W> {
    fn resolve(&mut self, colliding_name: &str) -> Option<String> {
        match self.ask(colliding_name) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "could not read log name from terminal");
                None
            }
        }
    }
}

/// Runs the CLI application with the given command.
///
/// # Examples
///
/// ```no_run
/// use scrambler::cli::{run_cli, ScrambleCommand};
///
/// let command = ScrambleCommand::Unscramble { log_path: "essays/essays_scramble.log".into() };
/// match run_cli(&command) {
///     Ok(()) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(command: &ScrambleCommand) -> Result<(), String> {
    run_cli_with_config(command, None)
}

/// Runs the CLI application with an optional configuration file, prompting
/// on the terminal if the log name is taken.
pub fn run_cli_with_config(
    command: &ScrambleCommand,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let config = ScramblerConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    execute(command, config, &mut LinePrompt::stdio())
}

/// Executes `command` with an already loaded configuration and the given
/// log name resolver.
pub fn execute(
    command: &ScrambleCommand,
    config: ScramblerConfig,
    resolver: &mut dyn LogNameResolver,
) -> Result<(), String> {
    match command {
        ScrambleCommand::Scramble {
            criteria,
            dry_run: true,
            ..
        } => scramble_dry_run(criteria, config),
        ScrambleCommand::Scramble {
            criteria, log_name, ..
        } => scramble_directory(criteria, log_name.as_deref(), config, resolver),
        ScrambleCommand::Unscramble { log_path } => unscramble_log(log_path),
    }
}

/// Scrambles the matched files and reports the result.
fn scramble_directory(
    criteria: &FilterCriteria,
    log_name: Option<&str>,
    config: ScramblerConfig,
    resolver: &mut dyn LogNameResolver,
) -> Result<(), String> {
    OutputFormatter::info(&format!(
        "Scrambling contents of: {}",
        criteria.directory.display()
    ));

    let scrambler = Scrambler::new(config);
    let pb = OutputFormatter::create_progress_bar(0);
    let mut advance = |name: &str, total: usize| {
        pb.set_length(total as u64);
        pb.set_message(name.to_string());
        pb.inc(1);
    };
    let outcome = scrambler.scramble_with_progress(criteria, log_name, resolver, &mut advance);
    pb.finish_and_clear();

    let report = match outcome.map_err(|e| e.to_string())? {
        ScrambleOutcome::Completed(report) => report,
        ScrambleOutcome::Aborted => {
            OutputFormatter::warning("Scrambling Aborted");
            return Ok(());
        }
    };

    OutputFormatter::success(&format!(
        "Scrambled {} {}",
        report.renamed.len(),
        if report.renamed.len() == 1 { "file" } else { "files" }
    ));
    OutputFormatter::plain(&format!(
        "Scrambling events written to {}",
        report.log_path.display()
    ));
    OutputFormatter::plain(&format!(
        "Use 'scrambler --unscramble {}' to restore the original names.",
        report.log_path.display()
    ));

    if !report.is_complete_success() {
        OutputFormatter::header("Not scrambled:");
        for (name, reason) in &report.failures {
            OutputFormatter::error(&format!("{}: {}", name, reason));
        }
        return Err(format!(
            "{} {} could not be scrambled",
            report.failures.len(),
            if report.failures.len() == 1 { "file" } else { "files" }
        ));
    }

    Ok(())
}

/// Lists the files a scramble would rename without touching anything.
fn scramble_dry_run(criteria: &FilterCriteria, config: ScramblerConfig) -> Result<(), String> {
    OutputFormatter::dry_run_notice(&format!(
        "Analyzing contents of: {}",
        criteria.directory.display()
    ));

    let files = Scrambler::new(config)
        .preview(criteria)
        .map_err(|e| e.to_string())?;

    if files.is_empty() {
        OutputFormatter::plain("No files match the given filters.");
        return Ok(());
    }

    OutputFormatter::header("Files that would be scrambled:");
    for name in &files {
        OutputFormatter::plain(&format!(" - {}", name));
    }
    OutputFormatter::summary_table(files.iter().map(String::as_str));

    OutputFormatter::dry_run_notice("No files were renamed and no log was written.");
    Ok(())
}

/// Replays a scramble log and reports the result.
fn unscramble_log(log_path: &Path) -> Result<(), String> {
    OutputFormatter::info(&format!("Unscrambling from: {}", log_path.display()));

    let report = Unscrambler::unscramble(log_path).map_err(|e| e.to_string())?;

    OutputFormatter::success(&format!("Restored: {}", report.restored_files()));

    if !report.skipped_files.is_empty() {
        OutputFormatter::warning(&format!("Skipped: {}", report.skipped_files.len()));
        for (name, reason) in &report.skipped_files {
            OutputFormatter::plain(&format!("    - {}: {}", name, reason));
        }
    }

    if !report.failed_restores.is_empty() {
        OutputFormatter::error(&format!("Failed: {}", report.failed_restores.len()));
        for (name, reason) in &report.failed_restores {
            OutputFormatter::plain(&format!("    - {}: {}", name, reason));
        }
    }

    if !report.is_complete_success() {
        return Err(format!(
            "Log file {} was NOT deleted due to failures. Please fix the issues and try again.",
            report.log_path.display()
        ));
    }

    if !report.log_deleted {
        return Err(format!(
            "All files restored, but the log file {} could not be deleted",
            report.log_path.display()
        ));
    }

    Ok(())
}
