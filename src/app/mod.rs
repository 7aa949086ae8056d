//! Orchestration of one retention run: configuration, inventory, plan,
//! deletion. Phases are strictly ordered and single-threaded; every
//! network call completes before the next is issued.

use std::path::Path;

use anyhow::Result;
use log::{info, warn};
use reqwest::Client;

use crate::config::Config;
use crate::executor::{self, DeleteStatus};
use crate::feed::{FeedClient, NuGetFeed};
use crate::inventory;
use crate::retention::{self, RetentionRule};

/// Counts from one completed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub planned: usize,
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Full run against the configured feed. The `--dry-run` flag ORs with the
/// document's own `dryRun` field.
pub async fn run(config_path: &Path, api_key: &str, dry_run_flag: bool) -> Result<RunSummary> {
    let config = Config::load(config_path)?;
    let dry_run = dry_run_flag || config.dry_run;

    let client = Client::builder().user_agent("nupkeep-cli").build()?;
    let feed = NuGetFeed::new(client, &config.source);

    info!(
        "Enforcing {} retention rules against {}{}",
        config.rules.len(),
        config.source,
        if dry_run { " (dry run)" } else { "" }
    );
    enforce(&feed, &config.rules, api_key, dry_run).await
}

/// Inventory → plan → execute, against any feed client.
pub async fn enforce(
    feed: &dyn FeedClient,
    rules: &[RetentionRule],
    api_key: &str,
    dry_run: bool,
) -> Result<RunSummary> {
    let inventory = inventory::load(feed).await?;
    let plan = retention::accumulate(&inventory, rules)?;
    info!(
        "{} of {} versions marked for deletion",
        plan.len(),
        inventory.len()
    );

    let outcomes = executor::execute(feed, &plan, api_key, dry_run).await;

    let mut summary = RunSummary {
        planned: plan.len(),
        ..RunSummary::default()
    };
    for outcome in &outcomes {
        match outcome.status {
            DeleteStatus::Deleted => summary.deleted += 1,
            DeleteStatus::Skipped => summary.skipped += 1,
            DeleteStatus::Failed(_) => summary.failed += 1,
        }
    }

    if summary.failed > 0 {
        warn!(
            "Run finished with failures: {} deleted, {} failed",
            summary.deleted, summary.failed
        );
    } else {
        info!(
            "Run finished: {} deleted, {} skipped",
            summary.deleted, summary.skipped
        );
    }
    Ok(summary)
}
