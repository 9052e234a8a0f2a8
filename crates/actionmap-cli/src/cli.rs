//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Actionmap CLI - Map analytics events onto destination payloads
///
/// Apply directive mappings and field maps to event payloads, list the keys a
/// mapping reads, and validate mapping files before they ship.
#[derive(Parser, Debug)]
#[command(
    name = "actionmap",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ACTIONMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a directive mapping to an event payload
    Transform(TransformArgs),

    /// Evaluate a field map against an event payload
    Evaluate(EvaluateArgs),

    /// List the payload keys a mapping reads
    Keys(KeysArgs),

    /// Check a mapping file for authoring errors
    Validate(ValidateArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the transform command
#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Path to the mapping file (JSON or YAML)
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Path to the payload file (JSON or YAML)
    #[arg(value_name = "PAYLOAD")]
    pub payload: PathBuf,

    /// Keep malformed directives as literals instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Disable HTML escaping of template placeholders
    #[arg(long)]
    pub no_escape: bool,

    /// Fail when the mapping produces no fields
    #[arg(long)]
    pub require_object: bool,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to")]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Path to the field map file (JSON or YAML)
    #[arg(value_name = "FIELD_MAP")]
    pub field_map: PathBuf,

    /// Path to the payload file (JSON or YAML)
    #[arg(value_name = "PAYLOAD")]
    pub payload: PathBuf,

    /// Spread the members of this nested object over the payload first
    #[arg(long, value_name = "KEY")]
    pub spread: Option<String>,

    /// Compile directive converts leniently
    #[arg(long)]
    pub lenient: bool,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to")]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the keys command
#[derive(Parser, Debug)]
pub struct KeysArgs {
    /// Path to the mapping file (JSON or YAML)
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Treat the file as a field map instead of a directive mapping
    #[arg(long)]
    pub field_map: bool,

    /// Remove duplicate keys, keeping the first occurrence
    #[arg(long)]
    pub unique: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the mapping file (JSON or YAML)
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Report problems without failing
    #[arg(long)]
    pub lenient: bool,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
