//! Command-line argument definitions for the K_Spk CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select where the expression comes from, which
//! symbol table and configuration to use, how the message is printed, and
//! logging verbosity.

use clap::{Parser, ValueEnum};

/// How the processed message is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per layer followed by a diagnostic count
    #[default]
    Summary,
    /// The parsed syntax tree, one node per line
    Tree,
    /// The parsed expression printed back as canonical source
    Source,
}

/// Command-line arguments for the K_Spk expression tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Expression to process; read from `--input` or stdin when omitted
    #[arg(help = "Expression to process")]
    pub expression: Option<String>,

    /// Path to a file holding the expression
    #[arg(short, long, conflicts_with = "expression")]
    pub input: Option<String>,

    /// Path to a symbol table (TOML); overrides the configuration file
    #[arg(short, long)]
    pub table: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Refuse expressions with unrecovered diagnostics
    #[arg(long)]
    pub strict: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
