//! Version handling for feed packages.
//!
//! Feed listings contain version strings in NuGet's relaxed form: one to
//! three numeric parts plus optional prerelease/build metadata. This module
//! normalizes them onto [`semver::Version`], whose ordering (prerelease
//! before the corresponding release) is what retention decisions rely on.

mod range;

use anyhow::{Context, Result, bail};
use semver::Version;

pub use range::{RangeParseError, VersionRange};

/// Parse a version string as it appears in a feed listing.
///
/// Pads missing minor/patch components with zeros, so `"1"` and `"1.0"`
/// both parse to `1.0.0`. Prerelease and build metadata pass through
/// unchanged. Legacy 4-part revision versions are rejected.
pub fn parse_lenient(input: &str) -> Result<Version> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("empty version string");
    }

    // Split the numeric core from any -prerelease/+build suffix.
    let suffix_at = trimmed.find(['-', '+']);
    let (core, suffix) = match suffix_at {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 {
        bail!("unsupported 4-part version: {input}");
    }

    let mut padded = String::with_capacity(trimmed.len() + 4);
    for i in 0..3 {
        if i > 0 {
            padded.push('.');
        }
        padded.push_str(parts.get(i).copied().unwrap_or("0"));
    }
    padded.push_str(suffix);

    Version::parse(&padded).with_context(|| format!("invalid version: {input}"))
}

/// Whether a version belongs to the prerelease lineage.
pub fn is_prerelease(version: &Version) -> bool {
    !version.pre.is_empty()
}
