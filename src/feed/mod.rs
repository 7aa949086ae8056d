//! Feed abstraction for package repositories.
//!
//! The retention logic only needs three operations from a feed: search the
//! package list, enumerate versions of one package, and delete one version.
//! Keeping them behind a trait lets the inventory loader and the deletion
//! executor run against an in-memory mock in tests.

mod nuget;

use anyhow::Result;
use async_trait::async_trait;

pub use nuget::NuGetFeed;

/// One package as returned by a feed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub id: String,
}

impl PackageSummary {
    pub fn new(id: impl Into<String>) -> Self {
        PackageSummary { id: id.into() }
    }
}

/// Operations the tool performs against a package feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Search the feed for packages matching `query` (empty matches all).
    /// Implementations return the complete result set, paging internally.
    async fn search(&self, query: &str, include_prerelease: bool) -> Result<Vec<PackageSummary>>;

    /// All version strings published for one package, as listed by the feed.
    async fn get_versions(&self, package: &PackageSummary) -> Result<Vec<String>>;

    /// Permanently delete one package version (hard delete, not unlist).
    async fn delete(&self, id: &str, version: &str, api_key: &str) -> Result<()>;
}
