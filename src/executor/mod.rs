//! Deletion executor: carries out the plan against the feed.
//!
//! Best-effort batch semantics: one failed delete is recorded and the rest
//! of the plan still runs. There is no rollback; the feed itself is the
//! only persisted state.

use log::{error, info};

use crate::feed::FeedClient;
use crate::retention::{DeletionPlan, PackageIdentity};

/// What happened to one planned deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    /// Dry run: the request was logged but never sent.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub identity: PackageIdentity,
    pub status: DeleteStatus,
}

/// Delete every identity in the plan, sequentially. Each attempt is logged
/// before the request goes out. With `dry_run` set, no request is sent.
pub async fn execute(
    feed: &dyn FeedClient,
    plan: &DeletionPlan,
    api_key: &str,
    dry_run: bool,
) -> Vec<DeleteOutcome> {
    let mut outcomes = Vec::with_capacity(plan.len());

    for identity in plan.iter() {
        let version = identity.version.to_string();

        if dry_run {
            info!("Would delete {} {} (dry run)", identity.id, version);
            outcomes.push(DeleteOutcome {
                identity: identity.clone(),
                status: DeleteStatus::Skipped,
            });
            continue;
        }

        info!("Deleting {} {}...", identity.id, version);
        let status = match feed.delete(&identity.id, &version, api_key).await {
            Ok(()) => DeleteStatus::Deleted,
            Err(e) => {
                error!("Failed to delete {} {}: {:#}", identity.id, version, e);
                DeleteStatus::Failed(format!("{e:#}"))
            }
        };
        outcomes.push(DeleteOutcome {
            identity: identity.clone(),
            status,
        });
    }

    outcomes
}
