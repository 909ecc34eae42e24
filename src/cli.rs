use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{date::DisplayFormat, group::GroupKind, order::ProblemStatus, output::OutputFormat};

#[derive(Debug, Parser)]
#[command(author, version, about = "Ingest, reconcile and group order sheets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract order lines from a sheet export, optionally for a single day
    Extract(ExtractArgs),
    /// Report lines in an incoming export that are not in an existing one
    Diff(DiffArgs),
    /// Group order lines into customer-level pick units
    Group(GroupArgs),
    /// Normalize or sort free-form dates
    #[command(subcommand)]
    Date(DateCommands),
    /// Create or check column mappings
    #[command(subcommand)]
    Mapping(MappingCommands),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Settings file holding the column mapping (defaults apply when omitted)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
    /// Only keep rows dated on this day (overrides the settings file)
    #[arg(short = 't', long = "target-date")]
    pub target_date: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Sheet export to read (header row first)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Previously loaded sheet export
    #[arg(long)]
    pub existing: PathBuf,
    /// Newly downloaded sheet export
    #[arg(long)]
    pub incoming: PathBuf,
    #[command(flatten)]
    pub source: SourceArgs,
    /// Also write existing plus new lines to this file (same format)
    #[arg(long)]
    pub merged: Option<PathBuf>,
    /// Output file for the new lines (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Sheet export to read (header row first)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub source: SourceArgs,
    /// Picking state JSON recording completed lines and problems
    #[arg(long)]
    pub state: Option<PathBuf>,
    /// Only groups whose every item has been picked
    #[arg(long, conflicts_with = "incomplete")]
    pub completed: bool,
    /// Only groups with items left to pick
    #[arg(long)]
    pub incomplete: bool,
    /// Restrict to these group kinds (repeatable)
    #[arg(long = "kind", value_enum, action = clap::ArgAction::Append)]
    pub kinds: Vec<GroupKind>,
    /// Only groups with at least one problem
    #[arg(long, conflicts_with_all = ["without_problems", "statuses"])]
    pub with_problems: bool,
    /// Only groups without problems
    #[arg(long, conflicts_with = "statuses")]
    pub without_problems: bool,
    /// Only groups with an item carrying one of these statuses (repeatable)
    #[arg(long = "status", value_enum, action = clap::ArgAction::Append)]
    pub statuses: Vec<ProblemStatus>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format (csv renders as a table)
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Write packer/packed-time row updates for completed lines to this CSV
    #[arg(long, requires = "packer")]
    pub updates: Option<PathBuf>,
    /// Packer name recorded in the updates
    #[arg(long)]
    pub packer: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DateCommands {
    /// Print the canonical and display form of each value
    Normalize(DateNormalizeArgs),
    /// Print values in chronological order
    Sort(DateSortArgs),
}

#[derive(Debug, Args)]
pub struct DateNormalizeArgs {
    /// Date strings to normalize
    #[arg(required = true)]
    pub values: Vec<String>,
    /// Display format for the second column
    #[arg(long, value_enum, default_value = "day-first")]
    pub display: DisplayFormat,
}

#[derive(Debug, Args)]
pub struct DateSortArgs {
    /// Date strings to sort
    #[arg(required = true)]
    pub values: Vec<String>,
    /// Newest first
    #[arg(long)]
    pub descending: bool,
}

#[derive(Debug, Subcommand)]
pub enum MappingCommands {
    /// Write a settings file populated with the default mapping
    Init(MappingInitArgs),
    /// Show how a sheet's header row resolves against the mapping
    Check(MappingCheckArgs),
}

#[derive(Debug, Args)]
pub struct MappingInitArgs {
    /// Destination settings file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct MappingCheckArgs {
    /// Sheet export whose header row is checked
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
