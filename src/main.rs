use clap::Parser;
use scrambler::cli::{ScrambleCommand, run_cli_with_config};
use scrambler::matcher::FilterCriteria;
use scrambler::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Randomize file names for blind review. Only files matching every given
/// filter are scrambled; the log written to the directory restores them.
#[derive(Parser, Debug)]
#[command(name = "scrambler")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Args {
    /// Directory to scramble.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Only scramble files with one of these extensions.
    #[arg(short = 'e', long = "extension", value_name = "EXT", num_args = 1..)]
    extensions: Vec<String>,

    /// Only scramble files whose name contains at least one of these substrings.
    #[arg(short = 's', long = "substring", value_name = "SUB", num_args = 1..)]
    substrings: Vec<String>,

    /// Only scramble files whose name matches this regex from the start.
    #[arg(short, long, value_name = "REGEX")]
    regex: Option<String>,

    /// Name of the log file; derived from the directory name otherwise.
    #[arg(short, long, value_name = "LOG")]
    log: Option<String>,

    /// List the files that would be scrambled without renaming anything.
    #[arg(long)]
    dry_run: bool,

    /// Restore original names from this scramble log.
    #[arg(
        short,
        long,
        value_name = "LOG",
        conflicts_with_all = ["directory", "extensions", "substrings", "regex", "log", "dry_run"]
    )]
    unscramble: Option<PathBuf>,

    /// Configuration file to use instead of the default locations.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print debug diagnostics.
    #[arg(long)]
    verbose: bool,

    /// Print version.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

impl Args {
    fn into_command(self) -> ScrambleCommand {
        match self.unscramble {
            Some(log_path) => ScrambleCommand::Unscramble { log_path },
            None => ScrambleCommand::Scramble {
                criteria: FilterCriteria {
                    directory: self.directory,
                    extensions: self.extensions,
                    substrings: self.substrings,
                    regex: self.regex,
                },
                log_name: self.log,
                dry_run: self.dry_run,
            },
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SCRAMBLER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("scrambler={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config_path = args.config.clone();
    let command = args.into_command();

    match run_cli_with_config(&command, config_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_short_v_prints_version() {
        for flag in ["-v", "--version"] {
            let err = Args::try_parse_from(["scrambler", flag]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_verbose_is_long_only() {
        let args = Args::try_parse_from(["scrambler", "--verbose"]).unwrap();
        assert!(args.verbose);
        assert!(Args::try_parse_from(["scrambler", "-V"]).is_err());
    }

    #[test]
    fn test_unscramble_conflicts_with_filters() {
        let err = Args::try_parse_from(["scrambler", "-u", "run.log", "-e", "txt"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
