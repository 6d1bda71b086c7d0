use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sdmx_cache::ArtifactKind;

/// Fetch and cache Eurostat SDMX structure definitions and data.
#[derive(Debug, Parser)]
#[command(name = "sdmx", version, propagate_version = true)]
pub struct Cli {
    /// TOML configuration file, layered over the built-in defaults
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv); RUST_LOG applies when absent
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the cache and staging directories
    Init,
    /// Print a dataset's structure definition
    Dsd(FetchArgs),
    /// Print a dataset's data document
    Data(FetchArgs),
    /// List dataflows (not supported by this client)
    Dataflow { id: String },
    /// Print where an artifact is cached
    Path {
        id: String,
        #[arg(value_enum)]
        kind: Kind,
    },
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Dataset code, e.g. une_rt_m
    pub id: String,

    /// Retrieve again even if cached
    #[arg(short, long)]
    pub refresh: bool,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Kind {
    Dsd,
    Data,
}

impl From<Kind> for ArtifactKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Dsd => ArtifactKind::StructureDefinition,
            Kind::Data => ArtifactKind::Data,
        }
    }
}
