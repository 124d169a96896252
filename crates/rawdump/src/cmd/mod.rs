use clap::{Args, Subcommand};
use std::path::PathBuf;

use rawdump_frame::{DecodeConfig, DEFAULT_MAX_FRAME_WORDS};
use rawdump_index::IndexErrorPolicy;
use rawdump_scan::{ScanConfig, ScanMode};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod dump;
pub mod index;
pub mod stats;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print decoded frames and per-window statistics.
    Dump(DumpArgs),
    /// Print per-window frame, loss and event counts.
    Stats(StatsArgs),
    /// List the acquisition windows of an index.
    Index(IndexArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: Option<OutputFormat>) -> CliResult<i32> {
    match command {
        Command::Dump(args) => dump::run(args, format.unwrap_or(OutputFormat::Pretty)),
        Command::Stats(args) => {
            stats::run(args, format.unwrap_or_else(OutputFormat::default_for_stdout))
        }
        Command::Index(args) => {
            index::run(args, format.unwrap_or_else(OutputFormat::default_for_stdout))
        }
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Data set prefix; reads <PREFIX>.idxf and <PREFIX>.rawf.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PREFIX",
        env = "RAWDUMP_INPUT"
    )]
    pub input: PathBuf,
    /// Fail on a malformed index record instead of stopping there.
    #[arg(long)]
    pub strict_index: bool,
}

impl InputArgs {
    pub fn index_policy(&self) -> IndexErrorPolicy {
        if self.strict_index {
            IndexErrorPolicy::Fail
        } else {
            IndexErrorPolicy::Stop
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Largest accepted frame size, in 64-bit words.
    #[arg(
        long,
        value_name = "WORDS",
        default_value_t = DEFAULT_MAX_FRAME_WORDS,
        env = "RAWDUMP_MAX_FRAME_WORDS"
    )]
    pub max_frame_words: u32,
}

impl DecodeArgs {
    pub fn decode_config(&self) -> CliResult<DecodeConfig> {
        if self.max_frame_words < 2 {
            return Err(CliError::new(
                USAGE,
                format!(
                    "--max-frame-words must be at least 2, got {}",
                    self.max_frame_words
                ),
            ));
        }
        Ok(DecodeConfig {
            max_frame_words: self.max_frame_words,
        })
    }
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub decode: DecodeArgs,
    /// Do not print frames without events.
    #[arg(long)]
    pub suppress_empty: bool,
    /// Print only the per-window statistics.
    #[arg(long)]
    pub stats_only: bool,
}

impl DumpArgs {
    pub fn scan_config(&self) -> CliResult<ScanConfig> {
        Ok(ScanConfig {
            mode: if self.stats_only {
                ScanMode::StatsOnly
            } else {
                ScanMode::Full
            },
            suppress_empty: self.suppress_empty,
            index_policy: self.input.index_policy(),
            decode: self.decode.decode_config()?,
        })
    }
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub decode: DecodeArgs,
}

impl StatsArgs {
    pub fn scan_config(&self) -> CliResult<ScanConfig> {
        Ok(ScanConfig {
            mode: ScanMode::StatsOnly,
            suppress_empty: false,
            index_policy: self.input.index_policy(),
            decode: self.decode.decode_config()?,
        })
    }
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
