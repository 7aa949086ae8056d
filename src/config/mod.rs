//! Configuration document: feed source, dry-run flag and retention rules.
//!
//! JSON, with field names accepted in both camelCase and PascalCase since
//! existing documents for the original tool used the latter. Retention
//! caps deserialize into unsigned integers, so a negative cap is rejected
//! here instead of being silently reinterpreted downstream.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::retention::RetentionRule;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the package feed.
    #[serde(alias = "Source")]
    pub source: String,

    /// Log intended deletions without issuing destructive requests.
    #[serde(default, rename = "dryRun", alias = "DryRun")]
    pub dry_run: bool,

    /// Rules applied in declaration order.
    #[serde(alias = "Rules")]
    pub rules: Vec<RetentionRule>,
}

impl Config {
    /// Read and validate a configuration document. Any failure here is
    /// fatal and happens before the first network request.
    pub fn load(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration file {}", path.display()))?;
        let config: Config =
            serde_json::from_str(&text).context("invalid configuration document")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            bail!("invalid configuration document: source must not be empty");
        }
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                bail!("invalid configuration document: rule with empty package id");
            }
        }
        Ok(())
    }
}
