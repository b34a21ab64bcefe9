//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status
//! lines, the rename progress bar and the dry-run summary table.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use scrambler::output::OutputFormatter;
    /// OutputFormatter::success("Scrambled 12 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` renames.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a table of file counts per extension.
    ///
    /// ```no_run
    /// use scrambler::output::OutputFormatter;
    ///
    /// OutputFormatter::summary_table(["a.txt", "b.txt", "c.pdf"]);
    /// ```
    pub fn summary_table<'a, I>(names: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut total_files = 0;
        for name in names {
            let (_, extension) = crate::matcher::split_extension(name);
            let label = if extension.is_empty() {
                "(none)"
            } else {
                extension
            };
            *counts.entry(label).or_insert(0) += 1;
            total_files += 1;
        }

        Self::header("SUMMARY");

        let width = counts.keys().map(|ext| ext.len()).max().unwrap_or(0).max(9);

        println!(
            "{:<width$} | {}",
            "Extension".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (extension, count) in &counts {
            println!(
                "{:<width$} | {} {}",
                extension,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
