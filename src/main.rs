use std::path::PathBuf;

use _model::Region;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use courses::{
    builder::{build, build_overpass, dedup_file},
    config::Config,
    dedup::Policy,
    output::write_us_index,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
struct Cli {
    /// YAML settings, defaults to ./courses.yaml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Download and build regions (all of them when none are given)
    Build {
        regions: Vec<Region>,
        /// Re-download extracts and ignore cached candidates
        #[arg(long)]
        force: bool,
    },
    /// Build one dataset from an Overpass JSON response
    Overpass {
        input: PathBuf,
        output: PathBuf,
        /// Meta for courses without address tags
        #[arg(long, default_value = "")]
        meta: String,
    },
    /// Deduplicate an existing output file again
    Dedup {
        input: PathBuf,
        /// Defaults to overwriting the input
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        policy: Option<Policy>,
    },
    /// Rebuild us_index.json from the state files
    Index,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Build { regions, force } => {
            let regions = if regions.is_empty() {
                Region::all()
            } else {
                regions
            };
            let built = build(&config, &regions, force)?;
            if built.is_empty() {
                bail!("no region produced any courses");
            }
            info!("built {} of {} regions", built.len(), regions.len());
        }
        Command::Overpass {
            input,
            output,
            meta,
        } => {
            build_overpass(&config, &input, &output, &meta)?;
        }
        Command::Dedup {
            input,
            output,
            policy,
        } => {
            if let Some(x) = policy {
                config.dedup.policy = x;
            }
            dedup_file(&config, &input, output.as_ref().unwrap_or(&input))?;
        }
        Command::Index => {
            write_us_index(&config.output_dir)?;
        }
    }

    Ok(())
}
