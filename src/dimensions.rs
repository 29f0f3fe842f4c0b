// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Dimension Aggregator
 * Groups normalized issues into named dimensions and computes per-dimension
 * and overall scores from issue severities
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::config::ScoringConfig;
use crate::types::{Issue, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// One named bucket of categorized issues.
///
/// `total` is authoritative: callers must prefer it over `issues.len()`
/// should a display cap ever be applied to the embedded list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    pub score: u32,
    pub total: usize,
    pub critical: usize,
    pub medium: usize,
    pub low: usize,
    pub issues: Vec<Issue>,
}

impl Dimension {
    fn empty() -> Self {
        Self {
            score: 100,
            total: 0,
            critical: 0,
            medium: 0,
            low: 0,
            issues: Vec::new(),
        }
    }
}

/// Aggregated dimension view of one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionReport {
    pub dimensions: BTreeMap<String, Dimension>,
    pub overall_score: u32,
}

/// Partition issues into dimensions and score them.
///
/// The classifier is supplied by the caller; `None` marks an issue as
/// uncategorized, which keeps it out of dimension scoring entirely. Every
/// dimension named in the scoring weight table is present in the output even
/// when empty, and an empty dimension scores a perfect 100.
///
/// Duplicate findings (same type, description prefix and location prefix)
/// are counted once.
pub fn aggregate<C>(issues: &[Issue], classifier: C, scoring: &ScoringConfig) -> DimensionReport
where
    C: Fn(&Issue) -> Option<String>,
{
    let mut dimensions: BTreeMap<String, Dimension> = scoring
        .weights
        .keys()
        .map(|name| (name.clone(), Dimension::empty()))
        .collect();

    let mut seen: HashSet<String> = HashSet::with_capacity(issues.len());

    for issue in issues {
        let id = issue_id(issue);
        if !seen.insert(id) {
            debug!(issue_type = issue.issue_type.as_str(), "Duplicate issue skipped");
            continue;
        }

        let Some(name) = classifier(issue) else {
            debug!(
                issue_type = issue.issue_type.as_str(),
                "Uncategorized issue excluded from dimension scoring"
            );
            continue;
        };

        let dimension = dimensions.entry(name).or_insert_with(Dimension::empty);
        match issue.severity {
            Severity::Critical => dimension.critical += 1,
            Severity::Medium => dimension.medium += 1,
            Severity::Low => dimension.low += 1,
        }
        dimension.total += 1;
        dimension.issues.push(issue.clone());
    }

    for (name, dimension) in dimensions.iter_mut() {
        dimension.score = score(dimension, scoring);
        debug!(
            dimension = name.as_str(),
            score = dimension.score,
            critical = dimension.critical,
            medium = dimension.medium,
            low = dimension.low,
            "Dimension scored"
        );
    }

    let overall_score = overall(&dimensions, scoring);

    DimensionReport {
        dimensions,
        overall_score,
    }
}

/// Start at 100, subtract a fixed penalty per issue by severity, clamp to
/// [0, 100]
fn score(dimension: &Dimension, scoring: &ScoringConfig) -> u32 {
    let deduction = dimension.critical as i64 * scoring.critical_penalty as i64
        + dimension.medium as i64 * scoring.medium_penalty as i64
        + dimension.low as i64 * scoring.low_penalty as i64;
    (100 - deduction).clamp(0, 100) as u32
}

/// Weighted mean over the configured per-dimension weights, normalized by
/// the weight mass of the dimensions actually present. Falls back to a plain
/// mean when no weights are configured.
fn overall(dimensions: &BTreeMap<String, Dimension>, scoring: &ScoringConfig) -> u32 {
    if dimensions.is_empty() {
        return 100;
    }

    if scoring.weights.is_empty() {
        let sum: u32 = dimensions.values().map(|d| d.score).sum();
        return (sum as f64 / dimensions.len() as f64).round() as u32;
    }

    let mut weighted = 0.0;
    let mut mass = 0.0;
    for (name, dimension) in dimensions {
        if let Some(weight) = scoring.weights.get(name) {
            weighted += dimension.score as f64 * weight;
            mass += weight;
        }
    }

    if mass == 0.0 {
        let sum: u32 = dimensions.values().map(|d| d.score).sum();
        return (sum as f64 / dimensions.len() as f64).round() as u32;
    }

    ((weighted / mass).round() as i64).clamp(0, 100) as u32
}

/// Stable identity of a finding, used for deduplication: type plus prefixes
/// of description and location, lowercased alphanumerics only.
pub fn issue_id(issue: &Issue) -> String {
    let squash = |s: &str, max: usize| -> String {
        s.chars()
            .take(max)
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    };

    let type_part = squash(&issue.issue_type, issue.issue_type.len());
    let desc_part = squash(&issue.description, 30);
    let location_part = squash(issue.location.as_deref().unwrap_or(""), 20);

    let mut id = format!("{}-{}-{}", type_part, desc_part, location_part);
    id.truncate(80);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(issue_type: &str, severity: Severity) -> Issue {
        Issue {
            issue_type: issue_type.to_string(),
            severity,
            description: format!("description for {}", issue_type),
            location: None,
            fix: None,
            details: None,
            url: None,
            value: None,
        }
    }

    fn classify_all_as(name: &'static str) -> impl Fn(&Issue) -> Option<String> {
        move |_| Some(name.to_string())
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let issues = vec![issue("a", Severity::Critical), issue("b", Severity::Medium)];
        let report = aggregate(&issues, classify_all_as("security"), &ScoringConfig::default());
        // 100 - 15 - 8
        assert_eq!(report.dimensions["security"].score, 77);
    }

    #[test]
    fn test_empty_dimension_scores_perfect() {
        let report = aggregate(&[], classify_all_as("security"), &ScoringConfig::default());
        for name in ["security", "seo", "performance", "compliance"] {
            assert_eq!(report.dimensions[name].score, 100, "dimension {}", name);
            assert_eq!(report.dimensions[name].total, 0);
        }
        assert_eq!(report.overall_score, 100);
    }

    #[test]
    fn test_score_clamps_at_zero() {
        let issues: Vec<Issue> = (0..20)
            .map(|i| issue(&format!("crit-{}", i), Severity::Critical))
            .collect();
        let report = aggregate(&issues, classify_all_as("security"), &ScoringConfig::default());
        assert_eq!(report.dimensions["security"].score, 0);
    }

    #[test]
    fn test_uncategorized_issues_are_excluded() {
        let issues = vec![issue("known", Severity::Critical), issue("mystery", Severity::Critical)];
        let classifier = |i: &Issue| {
            if i.issue_type == "known" {
                Some("security".to_string())
            } else {
                None
            }
        };
        let report = aggregate(&issues, classifier, &ScoringConfig::default());
        assert_eq!(report.dimensions["security"].total, 1);
        let counted: usize = report.dimensions.values().map(|d| d.total).sum();
        assert_eq!(counted, 1);
    }

    #[test]
    fn test_duplicate_issues_counted_once() {
        let duplicate = issue("missing-csp", Severity::Medium);
        let issues = vec![duplicate.clone(), duplicate];
        let report = aggregate(&issues, classify_all_as("security"), &ScoringConfig::default());
        assert_eq!(report.dimensions["security"].total, 1);
        assert_eq!(report.dimensions["security"].score, 92);
    }

    #[test]
    fn test_overall_score_uses_configured_weights() {
        // one critical security issue: security 85, others 100
        let issues = vec![issue("a", Severity::Critical)];
        let scoring = ScoringConfig::default();
        let report = aggregate(&issues, classify_all_as("security"), &scoring);
        // 85*0.35 + 100*0.25 + 100*0.25 + 100*0.15 = 94.75 -> 95
        assert_eq!(report.overall_score, 95);
    }

    #[test]
    fn test_overall_score_plain_mean_without_weights() {
        let scoring = ScoringConfig {
            weights: Default::default(),
            ..ScoringConfig::default()
        };
        let issues = vec![issue("a", Severity::Critical)];
        let report = aggregate(&issues, classify_all_as("security"), &scoring);
        assert_eq!(report.dimensions.len(), 1);
        assert_eq!(report.overall_score, 85);
    }

    #[test]
    fn test_dimension_counts_add_up() {
        let issues = vec![
            issue("a", Severity::Critical),
            issue("b", Severity::Medium),
            issue("c", Severity::Low),
            issue("d", Severity::Low),
        ];
        let report = aggregate(&issues, classify_all_as("seo"), &ScoringConfig::default());
        let dim = &report.dimensions["seo"];
        assert_eq!(dim.critical + dim.medium + dim.low, dim.total);
        assert_eq!(dim.total, dim.issues.len());
    }
}
