//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pts",
    version,
    about = "Power Table Studio - edit GPU power level tables in device trees",
    long_about = "Edit the GPU power level and voltage tables of decoded device tree sources.\n\n\
                  Splits and merges concatenated blobs, edits levels per chip profile,\n\
                  and exchanges tables between devices as compact envelopes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Editor configuration file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Split a concatenated blob into its device tree fragments.
    Split(SplitArgs),

    /// Concatenate fragments back into one blob.
    Merge(MergeArgs),

    /// List supported chip profiles.
    Chips,

    /// Guess chip profiles for a decoded source.
    Detect(DetectArgs),

    /// Print the bins and levels of a decoded source.
    Show(ShowArgs),

    /// Apply one change to a decoded source and save it.
    Edit(EditArgs),

    /// Write the tables of a decoded source to an envelope.
    Export(ExportArgs),

    /// Replace the tables of a decoded source from an envelope.
    Import(ImportArgs),

    /// Compile a decoded source with the configured blob compiler.
    Build(BuildArgs),
}

#[derive(Parser)]
pub struct SplitArgs {
    /// Concatenated blob, e.g. an extracted dtb partition image.
    #[arg(value_name = "BLOB")]
    pub blob: PathBuf,

    /// Directory for the numbered fragments.
    #[arg(long = "out", value_name = "DIR")]
    pub out: PathBuf,
}

#[derive(Parser)]
pub struct MergeArgs {
    /// Merged blob to write.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Fragments in the order they are concatenated.
    #[arg(value_name = "PARTS", required = true)]
    pub parts: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct DetectArgs {
    #[arg(value_name = "DTS")]
    pub source: PathBuf,
}

#[derive(Parser)]
pub struct SourceArgs {
    /// Decoded device tree source.
    #[arg(value_name = "DTS")]
    pub source: PathBuf,

    /// Chip profile key (see `pts chips`).
    #[arg(long = "chip", value_name = "KEY")]
    pub chip: String,
}

#[derive(Parser)]
pub struct ShowArgs {
    #[command(flatten)]
    pub target: SourceArgs,

    /// Print tab-separated rows instead of a table.
    #[arg(long = "plain")]
    pub plain: bool,
}

#[derive(Parser)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: SourceArgs,

    #[command(subcommand)]
    pub operation: EditOperation,
}

#[derive(Subcommand)]
pub enum EditOperation {
    /// Copy the first level of a bin to the top.
    AddTop {
        #[arg(long, default_value_t = 0)]
        bin: usize,
    },

    /// Copy the lowest editable level of a bin.
    AddBottom {
        #[arg(long, default_value_t = 0)]
        bin: usize,
    },

    /// Remove a level.
    Remove {
        #[arg(long, default_value_t = 0)]
        bin: usize,
        #[arg(long)]
        level: usize,
    },

    /// Move a level to another position in its bin.
    Move {
        #[arg(long, default_value_t = 0)]
        bin: usize,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },

    /// Set a numeric property of a level, e.g. `qcom,gpu-freq`.
    Set {
        #[arg(long, default_value_t = 0)]
        bin: usize,
        #[arg(long)]
        level: usize,
        #[arg(long)]
        key: String,
        /// Decimal or 0x-prefixed hexadecimal value.
        #[arg(long, value_parser = parse_value)]
        value: u64,
    },

    /// Point a level at a named voltage corner, e.g. `NOM_L1`.
    SetVoltage {
        #[arg(long, default_value_t = 0)]
        bin: usize,
        #[arg(long)]
        level: usize,
        #[arg(long)]
        label: String,
    },
}

#[derive(Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub target: SourceArgs,

    /// Free text stored with the tables.
    #[arg(long = "description", default_value = "")]
    pub description: String,

    /// Write the binary envelope here instead of printing armored text.
    #[arg(long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ImportArgs {
    #[command(flatten)]
    pub target: SourceArgs,

    /// Binary envelope file, or a file holding armored text.
    #[arg(value_name = "ENVELOPE")]
    pub envelope: PathBuf,
}

#[derive(Parser)]
pub struct BuildArgs {
    #[arg(value_name = "DTS")]
    pub source: PathBuf,

    /// Compiled blob to write.
    #[arg(long = "out", value_name = "DTB")]
    pub out: PathBuf,

    /// Kill the compiler after this many seconds (overrides the config).
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_value(text: &str) -> Result<u64, String> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|error| format!("'{text}' is not a number: {error}"))
}
