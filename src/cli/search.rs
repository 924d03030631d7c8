//! Search command - runs a search through the cache

use chrono::NaiveDate;
use clap::Args;
use tracing::info;

use crate::domain::search::{DateRange, DecisionStatus, SearchFilters, SearchRequest};
use crate::infrastructure::services::SearchOrchestrator;

use super::print_json;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Decision status (pending, approved, rejected, deferred)
    #[arg(long)]
    pub status: Option<DecisionStatus>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub assignee: Option<String>,

    /// Earliest creation date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest creation date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub offset: Option<u32>,

    /// Run the search this many times in one process
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,
}

impl SearchArgs {
    fn filters(&self) -> Option<SearchFilters> {
        let mut filters = SearchFilters::new();

        if let Some(status) = self.status {
            filters = filters.with_status(status);
        }
        if let Some(ref project) = self.project {
            filters = filters.with_project(project.clone());
        }
        if let Some(ref assignee) = self.assignee {
            filters = filters.with_assignee(assignee.clone());
        }
        if self.from.is_some() || self.to.is_some() {
            filters = filters.with_date_range(DateRange::new(self.from, self.to));
        }

        (!filters.is_empty()).then_some(filters)
    }

    pub fn to_request(&self) -> SearchRequest {
        let mut request = SearchRequest::new(self.query.clone());

        if let Some(filters) = self.filters() {
            request = request.with_filters(filters);
        }
        if let Some(limit) = self.limit {
            request = request.with_limit(limit);
        }
        if let Some(offset) = self.offset {
            request = request.with_offset(offset);
        }

        request
    }
}

pub async fn run(orchestrator: &SearchOrchestrator, args: SearchArgs) -> anyhow::Result<()> {
    let request = args.to_request();
    let key = orchestrator.cache_key_for(&request);
    info!(cache_key = %key, "Running search");

    for _ in 0..args.repeat.max(1) {
        let result = orchestrator.search(&request).await?;
        print_json(&result)?;
    }

    Ok(())
}
