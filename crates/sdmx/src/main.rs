//! `sdmx` - command-line front end of the SDMX dataset cache.
//!
//! - `sdmx init` creates the configured directories
//! - `sdmx dsd <ID>` / `sdmx data <ID>` print an artifact, retrieving it on a miss
//! - `sdmx path <ID> <dsd|data>` prints the cache location of an artifact

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use sdmx_cache::{ArtifactKind, CacheStore, ClientConfig, DatasetClient, DatasetId};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, FetchArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config =
        ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::Init => {
            sdmx_cache::initialize(&config).context("failed to create cache directories")?;
            println!("cache: {}", config.cache_dir.display());
            println!("staging: {}", config.staging_dir.display());
        }
        Command::Dsd(args) => fetch(config, ArtifactKind::StructureDefinition, args).await?,
        Command::Data(args) => fetch(config, ArtifactKind::Data, args).await?,
        Command::Dataflow { id } => {
            let client = DatasetClient::from_config(config)?;
            client
                .get_dataflow(&id)
                .await
                .with_context(|| format!("cannot list dataflows for '{id}'"))?;
        }
        Command::Path { id, kind } => {
            let id = DatasetId::new(id)?;
            let store = CacheStore::new(&config.cache_dir);
            println!("{}", store.path(&id, kind.into()).display());
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn fetch(config: ClientConfig, kind: ArtifactKind, args: FetchArgs) -> Result<()> {
    ensure_initialized(&config)?;
    let client = DatasetClient::from_config(config)?;

    let mut entry = match kind {
        ArtifactKind::StructureDefinition => client.get_metadata(&args.id, args.refresh).await,
        ArtifactKind::Data => client.get_data(&args.id, args.refresh).await,
    }
    .with_context(|| format!("failed to get {kind} of '{}'", args.id))?;

    match args.output {
        Some(path) => copy_to_file(&mut entry, &path).await,
        None => {
            let mut stdout = tokio::io::stdout();
            tokio::io::copy(&mut entry, &mut stdout)
                .await
                .context("failed to write to stdout")?;
            stdout.flush().await.context("failed to write to stdout")
        }
    }
}

fn ensure_initialized(config: &ClientConfig) -> Result<()> {
    for dir in [&config.cache_dir, &config.staging_dir] {
        anyhow::ensure!(
            dir.is_dir(),
            "directory '{}' does not exist; run `sdmx init` first",
            dir.display()
        );
    }
    Ok(())
}

async fn copy_to_file(entry: &mut File, path: &Path) -> Result<()> {
    let mut out = File::create(path)
        .await
        .with_context(|| format!("failed to create '{}'", path.display()))?;
    let bytes = tokio::io::copy(entry, &mut out)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    out.flush().await?;
    tracing::info!(path = %path.display(), bytes, "written");
    Ok(())
}
