use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// nupkeep - package feed retention enforcement
///
/// Enumerates every version of every package on the configured feed,
/// applies the retention rules from the configuration document, and
/// hard-deletes the excess older versions.
///
/// Example:
///   nupkeep retention.json $NUGET_API_KEY --dry-run
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the retention configuration document (JSON)
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// API key for authenticated deletion (also via NUPKEEP_API_KEY)
    #[arg(value_name = "API_KEY", env = "NUPKEEP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log intended deletions without issuing any delete request
    #[arg(long)]
    pub dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();
    let cli = Cli::parse();

    // Missing positional arguments are a usage request, not a failure.
    let (Some(config), Some(api_key)) = (cli.config, cli.api_key) else {
        Cli::command().print_help()?;
        return Ok(());
    };

    nupkeep::app::run(&config, &api_key, cli.dry_run).await?;
    Ok(())
}
