//! NuGet feed implementation.
//!
//! Talks to a BaGet-style server layout under one base URL: the V3 search
//! endpoint for the package list, the flat-container index for versions,
//! and the V2 package endpoint for hard deletes.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::http::HttpClient;

use super::{FeedClient, PackageSummary};

/// Search page size; pages are fetched until one comes back empty.
const PAGE_SIZE: usize = 100;

/// Guard against a server that never returns an empty page.
const MAX_PAGES: usize = 100;

/// NuGet API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct SearchResponse {
        pub data: Vec<SearchResult>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchResult {
        pub id: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct VersionIndex {
        pub versions: Vec<String>,
    }
}

/// Feed client for a NuGet-compatible server.
pub struct NuGetFeed {
    http_client: HttpClient,
    base_url: String,
}

impl NuGetFeed {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FeedClient for NuGetFeed {
    async fn search(&self, query: &str, include_prerelease: bool) -> Result<Vec<PackageSummary>> {
        let url = format!("{}/v3/search", self.base_url);
        let prerelease = if include_prerelease { "true" } else { "false" };
        let mut packages = Vec::new();

        for page in 0..MAX_PAGES {
            let skip = (page * PAGE_SIZE).to_string();
            let take = PAGE_SIZE.to_string();
            debug!("Searching feed, skip={} take={}...", skip, take);

            let response: api::SearchResponse = self
                .http_client
                .get_json_with_query(
                    &url,
                    &[
                        ("q", query),
                        ("prerelease", prerelease),
                        ("skip", &skip),
                        ("take", &take),
                    ],
                )
                .await?;

            if response.data.is_empty() {
                break;
            }

            packages.extend(response.data.into_iter().map(PackageSummary::from));
        }

        Ok(packages)
    }

    async fn get_versions(&self, package: &PackageSummary) -> Result<Vec<String>> {
        // The flat-container index is keyed by lowercased package id.
        let url = format!(
            "{}/v3-flatcontainer/{}/index.json",
            self.base_url,
            package.id.to_lowercase()
        );
        debug!("Fetching version index for {}...", package.id);

        let index: api::VersionIndex = self.http_client.get_json(&url).await?;
        Ok(index.versions)
    }

    async fn delete(&self, id: &str, version: &str, api_key: &str) -> Result<()> {
        let url = format!("{}/api/v2/package/{}/{}", self.base_url, id, version);
        self.http_client
            .delete(&url, &[("hardDelete", "true")], api_key)
            .await
    }
}

impl From<api::SearchResult> for PackageSummary {
    fn from(result: api::SearchResult) -> Self {
        PackageSummary { id: result.id }
    }
}
