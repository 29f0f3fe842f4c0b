// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical three-level severity scale.
///
/// Any other label produced by a check unit is coerced at normalization
/// time: `high` collapses into `Critical`, `info`/`informational` into
/// `Low`, and anything unrecognized into `Medium`. The remap is lossy on
/// purpose; the scoring formula is calibrated against these three levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Coerce a raw severity label into the canonical scale.
    ///
    /// Missing labels default to `Medium`, mirroring how absent severity is
    /// treated for any other unrecognized value.
    pub fn coerce(raw: Option<&str>) -> Severity {
        match raw {
            Some("critical") => Severity::Critical,
            Some("medium") => Severity::Medium,
            Some("low") => Severity::Low,
            Some("high") => Severity::Critical,
            Some("info") | Some("informational") => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remediation payload attached to an issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixSuggestion {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A single finding as emitted by a check unit, before normalization.
///
/// Every field is optional: check units are heterogeneous and this struct is
/// the lenient boundary they all funnel through. The normalizer repairs it
/// into an [`Issue`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RawIssue {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RawIssue {
    /// Convenience constructor for the common case
    pub fn new(issue_type: &str, severity: Severity, description: &str) -> Self {
        Self {
            issue_type: Some(issue_type.to_string()),
            severity: Some(severity.as_str().to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_fix(mut self, title: &str, description: &str, code: Option<&str>) -> Self {
        self.fix = Some(FixSuggestion {
            title: title.to_string(),
            description: description.to_string(),
            code: code.map(|c| c.to_string()),
        });
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A normalized finding. Invariants guaranteed by the normalizer:
/// non-empty `type`, valid three-level `severity`, non-empty `description`.
/// Optional fields are serialized only when present, never as nulls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixSuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl From<Issue> for RawIssue {
    fn from(issue: Issue) -> Self {
        RawIssue {
            issue_type: Some(issue.issue_type),
            severity: Some(issue.severity.as_str().to_string()),
            description: Some(issue.description),
            location: issue.location,
            fix: issue.fix,
            details: issue.details,
            url: issue.url,
            value: issue.value,
        }
    }
}

/// Outcome status of a single check unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Completed,
    Error,
}

/// Output of one check unit.
///
/// A unit in `Error` status still carries an empty issue list, never a
/// missing one, so downstream aggregation does not branch on unit failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub issues: Vec<RawIssue>,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl CheckResult {
    pub fn completed(issues: Vec<RawIssue>) -> Self {
        Self {
            issues,
            status: CheckStatus::Completed,
            error: None,
            metadata: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            issues: Vec::new(),
            status: CheckStatus::Error,
            error: Some(error.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Severity breakdown over a flat issue list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub critical: usize,
    pub medium: usize,
    pub low: usize,
}

impl Summary {
    pub fn of(issues: &[Issue]) -> Self {
        let critical = issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count();
        let medium = issues
            .iter()
            .filter(|i| i.severity == Severity::Medium)
            .count();
        let low = issues.iter().filter(|i| i.severity == Severity::Low).count();
        Self {
            total: issues.len(),
            critical,
            medium,
            low,
        }
    }
}

/// Per-unit entry in the `scanners` map of a scan record, kept for
/// observability: it is the only place where a partially failed scan is
/// distinguishable from a clean one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerReport {
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Severity-prioritized issue subset safe for unauthenticated display.
/// Remediation payloads are deliberately stripped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewIssue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    pub description: String,
}

/// The orchestrator's output: one immutable record per scan invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScanRecord {
    pub url: String,
    pub scan_id: String,
    pub timestamp: String,
    /// All normalized issues from all units, concatenated in fixed
    /// unit-registration order
    pub issues: Vec<Issue>,
    pub summary: Summary,
    pub scanners: BTreeMap<String, ScannerReport>,
    pub preview_issues: Vec<PreviewIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_coercion_totality() {
        assert_eq!(Severity::coerce(Some("critical")), Severity::Critical);
        assert_eq!(Severity::coerce(Some("medium")), Severity::Medium);
        assert_eq!(Severity::coerce(Some("low")), Severity::Low);
        assert_eq!(Severity::coerce(Some("high")), Severity::Critical);
        assert_eq!(Severity::coerce(Some("info")), Severity::Low);
        assert_eq!(Severity::coerce(Some("informational")), Severity::Low);
        assert_eq!(Severity::coerce(Some("bonkers")), Severity::Medium);
        assert_eq!(Severity::coerce(Some("")), Severity::Medium);
        assert_eq!(Severity::coerce(None), Severity::Medium);
    }

    #[test]
    fn test_summary_counts() {
        let issues = vec![
            Issue {
                issue_type: "a".into(),
                severity: Severity::Critical,
                description: "a".into(),
                location: None,
                fix: None,
                details: None,
                url: None,
                value: None,
            },
            Issue {
                issue_type: "b".into(),
                severity: Severity::Low,
                description: "b".into(),
                location: None,
                fix: None,
                details: None,
                url: None,
                value: None,
            },
        ];
        let summary = Summary::of(&issues);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.medium, 0);
        assert_eq!(summary.low, 1);
        assert_eq!(
            summary.critical + summary.medium + summary.low,
            summary.total
        );
    }

    #[test]
    fn test_issue_optional_fields_not_serialized_when_absent() {
        let issue = Issue {
            issue_type: "missing-csp".into(),
            severity: Severity::Medium,
            description: "Content-Security-Policy header is missing".into(),
            location: None,
            fix: None,
            details: None,
            url: None,
            value: None,
        };
        let json = serde_json::to_value(&issue).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("location"));
        assert!(!obj.contains_key("fix"));
        assert!(!obj.contains_key("details"));
        assert_eq!(obj["type"], "missing-csp");
        assert_eq!(obj["severity"], "medium");
    }

    #[test]
    fn test_failed_check_result_has_empty_issue_list() {
        let result = CheckResult::failed("connection refused");
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.issues.is_empty());
        assert_eq!(result.error.as_deref(), Some("connection refused"));
    }
}
