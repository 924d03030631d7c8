//! CLI module for the decision search cache
//!
//! Provides subcommands over the cached search interface:
//! - `search`: run a search through the cache
//! - `stats`, `sweep`, `clear`: cache administration
//! - `recent`: the caller's recent searches

pub mod cache;
pub mod recent;
pub mod search;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::{AnonymousIdentity, IdentityResolver, StaticIdentity};
use crate::infrastructure::logging;
use crate::infrastructure::search::InMemoryDecisionStore;
use crate::infrastructure::services::SearchOrchestrator;

/// Decision Search Cache - cached search over decision records
#[derive(Parser)]
#[command(name = "decision-search-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// JSON file with the decision records to search
    #[arg(long, global = true)]
    pub records: Option<PathBuf>,

    /// Caller identity recorded in telemetry; guest when omitted
    #[arg(long, global = true)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a search through the cache
    Search(search::SearchArgs),

    /// Show cache statistics
    Stats,

    /// Delete every expired cache entry
    Sweep,

    /// Delete one cache entry
    Clear(cache::ClearArgs),

    /// Show the caller's most recent searches
    Recent(recent::RecentArgs),
}

/// Loads configuration, initializes logging and runs the command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    logging::init_logging(&config.logging);

    let orchestrator = build_orchestrator(&config, &cli.global).await?;

    match cli.command {
        Command::Search(args) => search::run(&orchestrator, args).await,
        Command::Stats => cache::stats(&orchestrator).await,
        Command::Sweep => cache::sweep(&orchestrator).await,
        Command::Clear(args) => cache::clear(&orchestrator, args).await,
        Command::Recent(args) => recent::run(&orchestrator, args).await,
    }
}

async fn build_orchestrator(
    config: &AppConfig,
    global: &GlobalArgs,
) -> anyhow::Result<SearchOrchestrator> {
    let store = match global.records {
        Some(ref path) => InMemoryDecisionStore::from_json_file(path).await?,
        None => InMemoryDecisionStore::new(),
    };

    let identity: Arc<dyn IdentityResolver> = match global.user {
        Some(ref user) => Arc::new(StaticIdentity::new(user.clone())),
        None => Arc::new(AnonymousIdentity),
    };

    crate::create_orchestrator_with_config(config, Arc::new(store), identity).await
}

/// Writes a value to stdout as pretty JSON
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_with_filters() {
        let cli = Cli::try_parse_from([
            "decision-search-cache",
            "--records",
            "decisions.json",
            "search",
            "kitchen",
            "--status",
            "pending",
            "--limit",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.global.records, Some(PathBuf::from("decisions.json")));
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "kitchen");
                assert_eq!(args.limit, Some(5));
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_parse_invalid_status() {
        let result = Cli::try_parse_from(["decision-search-cache", "search", "x", "--status", "open"]);
        assert!(result.is_err());
    }
}
