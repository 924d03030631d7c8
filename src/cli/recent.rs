//! Recent command - lists the caller's latest searches

use clap::Args;

use crate::infrastructure::services::{SearchOrchestrator, DEFAULT_RECENT_LIMIT};

use super::print_json;

#[derive(Args, Debug, Clone)]
pub struct RecentArgs {
    #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
    pub limit: usize,
}

pub async fn run(orchestrator: &SearchOrchestrator, args: RecentArgs) -> anyhow::Result<()> {
    let entries = orchestrator.recent_queries(args.limit).await?;
    print_json(&entries)
}
