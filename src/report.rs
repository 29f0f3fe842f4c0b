// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Report Builder
 * Combines a raw scan record with dimension aggregation into the final
 * JSON-serializable report consumed by callers
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::config::ScoringConfig;
use crate::dimensions::{aggregate, DimensionReport};
use crate::types::{Issue, RawScanRecord};
use serde::{Deserialize, Serialize};

/// The full processed report: the raw record plus categorized, scored
/// dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    #[serde(flatten)]
    pub record: RawScanRecord,
    #[serde(flatten)]
    pub dimensions: DimensionReport,
}

/// Build the final report from a finished scan record.
///
/// The classifier is injected by the caller; see
/// [`crate::categorization::classify`] for the default mapping.
pub fn build_report<C>(record: RawScanRecord, classifier: C, scoring: &ScoringConfig) -> ScanReport
where
    C: Fn(&Issue) -> Option<String>,
{
    let dimensions = aggregate(&record.issues, classifier, scoring);
    ScanReport { record, dimensions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorization::classify;
    use crate::types::{CheckStatus, PreviewIssue, ScannerReport, Severity, Summary};
    use std::collections::BTreeMap;

    fn record_with(issues: Vec<Issue>) -> RawScanRecord {
        let summary = Summary::of(&issues);
        let preview_issues: Vec<PreviewIssue> = Vec::new();
        let mut scanners = BTreeMap::new();
        scanners.insert(
            "headers".to_string(),
            ScannerReport {
                status: CheckStatus::Completed,
                error: None,
                issues: issues.clone(),
                metadata: None,
            },
        );
        RawScanRecord {
            url: "https://example.com".into(),
            scan_id: "scan_test".into(),
            timestamp: "2026-01-01T00:00:00Z".into(),
            issues,
            summary,
            scanners,
            preview_issues,
        }
    }

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

    #[test]
    fn test_report_categorizes_and_scores() {
        let record = record_with(vec![
            issue("missing-csp", Severity::Medium),
            issue("missing-title", Severity::Medium),
        ]);
        let report = build_report(record, classify, &ScoringConfig::default());

        assert_eq!(report.dimensions.dimensions["security"].total, 1);
        assert_eq!(report.dimensions.dimensions["seo"].total, 1);
        assert_eq!(report.dimensions.dimensions["security"].score, 92);
        assert_eq!(report.dimensions.dimensions["performance"].score, 100);
    }

    #[test]
    fn test_report_serializes_flat() {
        let record = record_with(vec![issue("missing-csp", Severity::Medium)]);
        let report = build_report(record, classify, &ScoringConfig::default());
        let json = serde_json::to_value(&report).unwrap();
        let obj = json.as_object().unwrap();
        // record fields and dimension fields sit side by side
        assert!(obj.contains_key("scanId"));
        assert!(obj.contains_key("summary"));
        assert!(obj.contains_key("dimensions"));
        assert!(obj.contains_key("overallScore"));
    }
}
