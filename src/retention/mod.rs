//! Retention rules and the selection of versions to delete.
//!
//! A rule caps how many stable and prerelease versions of one package
//! survive within each of its version ranges. Stable and prerelease
//! lineages are governed independently: a package typically keeps several
//! stable releases but only the newest prerelease, and mixing the two
//! would either over-retain prereleases or delete stable releases early.

use std::collections::HashSet;
use std::fmt;

use anyhow::{Context, Result};
use semver::Version;
use serde::Deserialize;

use crate::version::{VersionRange, is_prerelease};

/// One package version discovered on the feed. Equality is (id, version);
/// the id is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    pub id: String,
    pub version: Version,
}

impl PackageIdentity {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        PackageIdentity {
            id: id.into(),
            version,
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// Declarative retention policy for one package id.
///
/// `version` and `versions` both contribute range expressions; a rule with
/// neither matches no range and yields no deletions.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionRule {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(default, alias = "Version")]
    pub version: Option<String>,
    #[serde(default, alias = "Versions")]
    pub versions: Option<Vec<String>>,
    /// Max stable versions to keep per matching range.
    #[serde(alias = "Stable")]
    pub stable: u32,
    /// Max prerelease versions to keep per matching range.
    #[serde(alias = "Prerelease")]
    pub prerelease: u32,
}

impl RetentionRule {
    /// All range expressions this rule applies, in declaration order.
    fn range_expressions(&self) -> Vec<&str> {
        let mut expressions = Vec::new();
        if let Some(version) = &self.version {
            expressions.push(version.as_str());
        }
        if let Some(versions) = &self.versions {
            expressions.extend(versions.iter().map(String::as_str));
        }
        expressions
    }
}

/// The accumulated set of versions marked for removal. Insertion-ordered
/// for reproducible logging, deduplicated so a version matched by several
/// rules is deleted once.
#[derive(Debug, Default)]
pub struct DeletionPlan {
    items: Vec<PackageIdentity>,
    seen: HashSet<PackageIdentity>,
}

impl DeletionPlan {
    pub fn new() -> Self {
        DeletionPlan::default()
    }

    /// Insert an identity; returns false if it was already planned.
    pub fn insert(&mut self, identity: PackageIdentity) -> bool {
        if self.seen.contains(&identity) {
            return false;
        }
        self.seen.insert(identity.clone());
        self.items.push(identity);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageIdentity> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, identity: &PackageIdentity) -> bool {
        self.seen.contains(identity)
    }
}

/// Entries of one lineage that exceed the retention cap, newest first.
///
/// The sort is stable, so versions comparing equal keep their inventory
/// order and repeated runs produce the same plan.
fn lineage_overflow<'a>(
    inventory: &'a [PackageIdentity],
    rule: &RetentionRule,
    range: &VersionRange,
    prerelease: bool,
    cap: u32,
) -> Vec<&'a PackageIdentity> {
    let mut lineage: Vec<&PackageIdentity> = inventory
        .iter()
        .filter(|pkg| {
            pkg.id == rule.id
                && is_prerelease(&pkg.version) == prerelease
                && range.satisfies(&pkg.version)
        })
        .collect();
    lineage.sort_by(|a, b| b.version.cmp(&a.version));
    lineage.into_iter().skip(cap as usize).collect()
}

/// Compute the versions one rule marks for removal.
///
/// For each range expression the matching inventory entries are split into
/// stable and prerelease lineages, each sorted newest first; everything
/// beyond the lineage's cap is removed. Results are unioned across ranges.
/// A malformed range expression is a configuration defect and fails the run.
pub fn evaluate(
    inventory: &[PackageIdentity],
    rule: &RetentionRule,
) -> Result<Vec<PackageIdentity>> {
    let mut removals = Vec::new();
    let mut seen: HashSet<&PackageIdentity> = HashSet::new();

    for expression in rule.range_expressions() {
        let range: VersionRange = expression.parse().with_context(|| {
            format!(
                "invalid version range {:?} in rule for package {:?}",
                expression, rule.id
            )
        })?;

        for (prerelease, cap) in [(false, rule.stable), (true, rule.prerelease)] {
            for pkg in lineage_overflow(inventory, rule, &range, prerelease, cap) {
                if seen.insert(pkg) {
                    removals.push(pkg.clone());
                }
            }
        }
    }

    Ok(removals)
}

/// Evaluate every rule in configured order and union the results into one
/// deduplicated plan.
pub fn accumulate(inventory: &[PackageIdentity], rules: &[RetentionRule]) -> Result<DeletionPlan> {
    let mut plan = DeletionPlan::new();
    for rule in rules {
        for identity in evaluate(inventory, rule)? {
            plan.insert(identity);
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::parse_lenient;

    fn pkg(id: &str, version: &str) -> PackageIdentity {
        PackageIdentity::new(id, parse_lenient(version).unwrap())
    }

    fn rule(id: &str, version: &str, stable: u32, prerelease: u32) -> RetentionRule {
        RetentionRule {
            id: id.to_string(),
            version: Some(version.to_string()),
            versions: None,
            stable,
            prerelease,
        }
    }

    fn ids(removals: &[PackageIdentity]) -> Vec<String> {
        let mut out: Vec<String> = removals.iter().map(|p| p.to_string()).collect();
        out.sort();
        out
    }

    #[test]
    fn test_keeps_newest_stable_and_drops_prereleases() {
        // inventory {A@1.0, A@1.1, A@1.2, A@2.0-beta, A@2.0},
        // rule {stable: 2, prerelease: 0} over "*"
        let inventory = vec![
            pkg("A", "1.0"),
            pkg("A", "1.1"),
            pkg("A", "1.2"),
            pkg("A", "2.0-beta"),
            pkg("A", "2.0"),
        ];
        let removals = evaluate(&inventory, &rule("A", "*", 2, 0)).unwrap();
        assert_eq!(ids(&removals), vec!["A 1.0.0", "A 2.0.0-beta"]);
    }

    #[test]
    fn test_never_removes_other_ids() {
        let inventory = vec![pkg("A", "1.0"), pkg("B", "1.0"), pkg("B", "2.0")];
        let removals = evaluate(&inventory, &rule("B", "*", 0, 0)).unwrap();
        assert!(removals.iter().all(|p| p.id == "B"));
        assert_eq!(removals.len(), 2);
    }

    #[test]
    fn test_retains_min_of_cap_and_lineage_size() {
        let inventory = vec![pkg("A", "1.0"), pkg("A", "1.1")];
        // cap larger than lineage: nothing removed
        assert!(evaluate(&inventory, &rule("A", "*", 5, 5)).unwrap().is_empty());
        // cap 1: only the newest survives
        let removals = evaluate(&inventory, &rule("A", "*", 1, 0)).unwrap();
        assert_eq!(ids(&removals), vec!["A 1.0.0"]);
    }

    #[test]
    fn test_zero_caps_remove_all_matches() {
        let inventory = vec![pkg("A", "1.0"), pkg("A", "2.0"), pkg("A", "3.0-rc1")];
        let removals = evaluate(&inventory, &rule("A", "*", 0, 0)).unwrap();
        assert_eq!(removals.len(), 3);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let inventory = vec![pkg("A", "1.0"), pkg("A", "1.1"), pkg("A", "1.2")];
        let r = rule("A", "*", 1, 0);
        let first = evaluate(&inventory, &r).unwrap();
        let second = evaluate(&inventory, &r).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_rule_yields_nothing() {
        let inventory = vec![pkg("A", "1.0")];
        let degenerate = RetentionRule {
            id: "A".to_string(),
            version: None,
            versions: None,
            stable: 0,
            prerelease: 0,
        };
        assert!(evaluate(&inventory, &degenerate).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_id_yields_nothing() {
        let inventory = vec![pkg("A", "1.0")];
        assert!(evaluate(&inventory, &rule("Zzz", "*", 0, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_range_limits_the_candidates() {
        let inventory = vec![pkg("A", "0.9"), pkg("A", "1.0"), pkg("A", "1.5")];
        // only versions in [1.0,2.0) are candidates; 0.9 stays untouched
        let removals = evaluate(&inventory, &rule("A", "[1.0,2.0)", 1, 0)).unwrap();
        assert_eq!(ids(&removals), vec!["A 1.0.0"]);
    }

    #[test]
    fn test_disjoint_ranges_evaluated_independently() {
        let inventory = vec![
            pkg("A", "1.0"),
            pkg("A", "1.1"),
            pkg("A", "2.0"),
            pkg("A", "2.1"),
            pkg("A", "3.5"),
        ];
        let r = RetentionRule {
            id: "A".to_string(),
            version: None,
            versions: Some(vec!["[1.0,2.0)".to_string(), "[2.0,3.0)".to_string()]),
            stable: 1,
            prerelease: 0,
        };
        let removals = evaluate(&inventory, &r).unwrap();
        // newest of each bracket survives; 3.5 is outside both ranges
        assert_eq!(ids(&removals), vec!["A 1.0.0", "A 2.0.0"]);
    }

    #[test]
    fn test_version_and_versions_both_apply() {
        let inventory = vec![pkg("A", "1.0"), pkg("A", "1.1"), pkg("A", "2.0")];
        let r = RetentionRule {
            id: "A".to_string(),
            version: Some("[1.0,2.0)".to_string()),
            versions: Some(vec!["[2.0]".to_string()]),
            stable: 0,
            prerelease: 0,
        };
        let removals = evaluate(&inventory, &r).unwrap();
        assert_eq!(removals.len(), 3);
    }

    #[test]
    fn test_overlapping_ranges_dedup_within_rule() {
        let inventory = vec![pkg("A", "1.0"), pkg("A", "1.1")];
        let r = RetentionRule {
            id: "A".to_string(),
            version: None,
            versions: Some(vec!["*".to_string(), "[1.0,2.0)".to_string()]),
            stable: 0,
            prerelease: 0,
        };
        let removals = evaluate(&inventory, &r).unwrap();
        assert_eq!(removals.len(), 2);
    }

    #[test]
    fn test_bad_range_is_fatal() {
        let inventory = vec![pkg("A", "1.0")];
        let err = evaluate(&inventory, &rule("A", "[1.0,2.0", 0, 0)).unwrap_err();
        assert!(err.to_string().contains("invalid version range"));
    }

    #[test]
    fn test_accumulate_unions_rules_order_independently() {
        let inventory = vec![
            pkg("A", "1.0"),
            pkg("A", "1.1"),
            pkg("B", "1.0"),
            pkg("B", "1.1"),
        ];
        let rule_a = rule("A", "*", 1, 0);
        let rule_b = rule("B", "*", 1, 0);

        let forward = accumulate(&inventory, &[rule_a.clone(), rule_b.clone()]).unwrap();
        let backward = accumulate(&inventory, &[rule_b, rule_a]).unwrap();

        let mut fwd: Vec<String> = forward.iter().map(|p| p.to_string()).collect();
        let mut bwd: Vec<String> = backward.iter().map(|p| p.to_string()).collect();
        fwd.sort();
        bwd.sort();
        assert_eq!(fwd, bwd);
        assert_eq!(fwd, vec!["A 1.0.0", "B 1.0.0"]);
    }

    #[test]
    fn test_accumulate_dedups_across_rules() {
        let inventory = vec![pkg("A", "1.0"), pkg("A", "1.1")];
        let plan = accumulate(
            &inventory,
            &[rule("A", "*", 1, 0), rule("A", "[1.0,2.0)", 1, 0)],
        )
        .unwrap();
        assert_eq!(plan.len(), 1);
        assert!(plan.contains(&pkg("A", "1.0")));
    }

    #[test]
    fn test_rules_for_different_ids_never_interact() {
        let inventory = vec![pkg("A", "1.0"), pkg("B", "1.0")];
        let plan = accumulate(&inventory, &[rule("A", "*", 0, 0), rule("B", "*", 0, 0)]).unwrap();
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_plan_insert_reports_duplicates() {
        let mut plan = DeletionPlan::new();
        assert!(plan.insert(pkg("A", "1.0")));
        assert!(!plan.insert(pkg("A", "1.0")));
        assert_eq!(plan.len(), 1);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_rule_deserializes_pascal_case_aliases() {
        let rule: RetentionRule = serde_json::from_str(
            r#"{ "Id": "A", "Version": "*", "Stable": 3, "Prerelease": 1 }"#,
        )
        .unwrap();
        assert_eq!(rule.id, "A");
        assert_eq!(rule.version.as_deref(), Some("*"));
        assert_eq!(rule.stable, 3);
        assert_eq!(rule.prerelease, 1);
    }

    #[test]
    fn test_rule_rejects_negative_caps() {
        let result: Result<RetentionRule, _> =
            serde_json::from_str(r#"{ "id": "A", "version": "*", "stable": -1, "prerelease": 0 }"#);
        assert!(result.is_err());
    }
}
