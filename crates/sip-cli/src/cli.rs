//! CLI argument definitions for the SIP builder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sip-builder",
    version,
    about = "SIP Builder - convert Information Packages into submission packages",
    long_about = "Convert validated Information Packages into standards-conformant\n\
                  Submission Information Packages for long-term preservation.\n\n\
                  Generates the preservation METS, Dublin Core, and significant-\n\
                  properties documents, validates them against configured XML\n\
                  schemas, and assembles the SIP directory layout."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a SIP from an IP directory.
    Build(BuildArgs),

    /// List the configured schema registry.
    Schemas,
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Path to the IP directory.
    #[arg(value_name = "IP_DIR")]
    pub ip_dir: PathBuf,

    /// Output root the SIP directory is created under
    /// (default: the SIP_OUTPUT configuration value).
    #[arg(long = "output-root", value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Write the frozen build report as JSON to a file.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
