//! Inventory loading: the ground-truth list of every version of every
//! package on the feed. No filtering happens here; every rule evaluation
//! draws from this superset, so a partial load would corrupt the plan and
//! any failure is fatal.

use anyhow::{Context, Result};
use log::{debug, info};

use crate::feed::FeedClient;
use crate::retention::PackageIdentity;
use crate::version::parse_lenient;

/// Enumerate all packages and all of their versions, flattened into
/// identities. Prerelease packages are always included.
pub async fn load(feed: &dyn FeedClient) -> Result<Vec<PackageIdentity>> {
    let packages = feed
        .search("", true)
        .await
        .context("feed unavailable: package search failed")?;
    info!("Feed listed {} packages", packages.len());

    let mut inventory = Vec::new();
    for package in &packages {
        let versions = feed
            .get_versions(package)
            .await
            .with_context(|| format!("feed unavailable: version listing failed for {}", package.id))?;
        debug!("{}: {} versions", package.id, versions.len());

        for version in versions {
            let parsed = parse_lenient(&version).with_context(|| {
                format!("malformed feed listing for {}: {:?}", package.id, version)
            })?;
            inventory.push(PackageIdentity::new(package.id.clone(), parsed));
        }
    }

    info!("Inventory holds {} package versions", inventory.len());
    Ok(inventory)
}
