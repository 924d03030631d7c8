//! Cache administration commands

use clap::Args;
use serde_json::json;

use crate::domain::cache::CacheKey;
use crate::infrastructure::services::SearchOrchestrator;

use super::print_json;

#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    /// Cache key to delete, as printed by `search` logs
    pub key: CacheKey,
}

pub async fn stats(orchestrator: &SearchOrchestrator) -> anyhow::Result<()> {
    let stats = orchestrator.cache_stats().await?;
    print_json(&stats)
}

pub async fn sweep(orchestrator: &SearchOrchestrator) -> anyhow::Result<()> {
    let removed = orchestrator.clear_cache(None).await?;
    print_json(&json!({ "removed": removed }))
}

pub async fn clear(orchestrator: &SearchOrchestrator, args: ClearArgs) -> anyhow::Result<()> {
    let removed = orchestrator.clear_cache(Some(&args.key)).await?;
    print_json(&json!({ "key": args.key, "removed": removed }))
}
