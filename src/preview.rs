// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

use crate::types::{Issue, PreviewIssue, Severity};

/// Pick a severity-prioritized subset of issues for untrusted display.
///
/// Deterministic priority fill: criticals first in original order, then
/// mediums, then lows, truncated to `max_count`. Remediation payloads and
/// every other detail are stripped; the preview carries only type, severity
/// and description.
pub fn select_preview(issues: &[Issue], max_count: usize) -> Vec<PreviewIssue> {
    if issues.is_empty() || max_count == 0 {
        return Vec::new();
    }

    let mut selected: Vec<&Issue> = Vec::with_capacity(max_count);

    for severity in [Severity::Critical, Severity::Medium, Severity::Low] {
        if selected.len() >= max_count {
            break;
        }
        selected.extend(
            issues
                .iter()
                .filter(|i| i.severity == severity)
                .take(max_count - selected.len()),
        );
    }

    selected
        .into_iter()
        .take(max_count)
        .map(|issue| PreviewIssue {
            issue_type: issue.issue_type.clone(),
            severity: issue.severity,
            description: issue.description.clone(),
        })
        .collect()
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
            fix: Some(crate::types::FixSuggestion {
                title: "Fix it".into(),
                description: "How to fix it".into(),
                code: None,
            }),
            details: Some("internal details".into()),
            url: None,
            value: None,
        }
    }

    #[test]
    fn test_critical_issues_take_priority() {
        let issues = vec![
            issue("low-1", Severity::Low),
            issue("crit-1", Severity::Critical),
            issue("low-2", Severity::Low),
            issue("med-1", Severity::Medium),
            issue("crit-2", Severity::Critical),
            issue("low-3", Severity::Low),
            issue("low-4", Severity::Low),
            issue("low-5", Severity::Low),
        ];

        let preview = select_preview(&issues, 3);
        assert_eq!(preview.len(), 3);
        // 2 critical + 1 medium, in original order, no lows
        assert_eq!(preview[0].issue_type, "crit-1");
        assert_eq!(preview[1].issue_type, "crit-2");
        assert_eq!(preview[2].issue_type, "med-1");
    }

    #[test]
    fn test_preview_strips_fix_and_details() {
        let issues = vec![issue("crit-1", Severity::Critical)];
        let preview = select_preview(&issues, 3);
        let json = serde_json::to_value(&preview[0]).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(
            obj.keys().collect::<Vec<_>>(),
            vec!["description", "severity", "type"]
        );
    }

    #[test]
    fn test_fills_from_lower_severities_when_short() {
        let issues = vec![issue("med-1", Severity::Medium), issue("low-1", Severity::Low)];
        let preview = select_preview(&issues, 3);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0].issue_type, "med-1");
        assert_eq!(preview[1].issue_type, "low-1");
    }

    #[test]
    fn test_never_exceeds_max_count() {
        let issues: Vec<Issue> = (0..10)
            .map(|i| issue(&format!("crit-{}", i), Severity::Critical))
            .collect();
        assert_eq!(select_preview(&issues, 3).len(), 3);
        assert!(select_preview(&issues, 0).is_empty());
        assert!(select_preview(&[], 3).is_empty());
    }
}
