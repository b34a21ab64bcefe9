//! scrambler - Randomize file names for blind review, then restore them
//!
//! This library selects files in a directory by extension, substring and
//! regex filters, renames them to random names while recording each rename
//! in a scramble log, and replays that log in reverse to restore the
//! original names.

pub mod cli;
pub mod config;
pub mod matcher;
pub mod namer;
pub mod output;
pub mod scramble_log;
pub mod scrambler;
pub mod unscramble;

pub use config::{ConfigError, ScramblerConfig};
pub use matcher::{FileMatcher, FilterCriteria, MatchSet, match_files};
pub use namer::{NameGenerator, generate_name};
pub use scramble_log::{LOG_HEADER, LogEntry};
pub use scrambler::{
    AbortOnCollision, LogNameResolver, ScrambleError, ScrambleOutcome, ScrambleReport,
    ScrambleResult, Scrambler,
};
pub use unscramble::{UnscrambleReport, Unscrambler};

pub use cli::{ScrambleCommand, run_cli};
