use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod check;
pub mod digest;
pub mod fmt;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a config document against a schema.
    Check(CheckArgs),
    /// Print the content digest of a config document.
    Digest(DigestArgs),
    /// Parse a schema and print it in canonical form.
    Fmt(FmtArgs),
    /// List every prop of a schema with its constraints.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Check(args) => check::run(args, format),
        Command::Digest(args) => digest::run(args, format),
        Command::Fmt(args) => fmt::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Config document (JSON object).
    pub config: PathBuf,
    /// Schema file.
    #[arg(long, value_name = "FILE", conflicts_with = "registry", required_unless_present = "registry")]
    pub schema: Option<PathBuf>,
    /// Directory of `<name>.schema.json` files.
    #[arg(long, value_name = "DIR", requires = "name")]
    pub registry: Option<PathBuf>,
    /// Schema name within --registry.
    #[arg(long, value_name = "NAME", requires = "registry")]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Config document (JSON object).
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Schema file.
    pub schema: PathBuf,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Schema file.
    pub schema: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
