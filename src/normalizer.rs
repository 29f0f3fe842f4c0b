// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Issue Normalizer
 * Single validation chokepoint: coerces heterogeneous check-unit output
 * into the canonical issue schema, repairing invalid and missing fields
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::types::{Issue, RawIssue, Severity};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

/// Normalize a batch of raw issues.
///
/// Ordering is preserved and nothing is ever rejected: missing fields are
/// repaired independently per entry. Output length equals input length here;
/// only [`normalize_values`] can drop entries (nulls and non-objects).
pub fn normalize(raw: Vec<RawIssue>) -> Vec<Issue> {
    raw.into_iter().map(normalize_one).collect()
}

/// Normalize a loose JSON batch from an external collaborator.
///
/// Null and non-object entries are logged and skipped; one bad entry never
/// fails the batch.
pub fn normalize_values(values: Vec<Value>) -> Vec<Issue> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match value {
            Value::Null => {
                warn!(index = index, "Null issue entry, skipping");
                None
            }
            Value::Object(_) => Some(normalize_one(raw_from_value(&value))),
            other => {
                warn!(index = index, entry = %other, "Non-object issue entry, skipping");
                None
            }
        })
        .collect()
}

fn normalize_one(raw: RawIssue) -> Issue {
    let issue_type = match raw.issue_type.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => synthesize_type(),
    };

    let severity_raw = raw.severity.as_deref();
    let severity = Severity::coerce(severity_raw);
    if let Some(label) = severity_raw {
        if !matches!(label, "critical" | "medium" | "low") {
            debug!(
                issue_type = issue_type.as_str(),
                label = label,
                coerced = severity.as_str(),
                "Normalizing invalid severity"
            );
        }
    }

    let description = match raw.description {
        Some(d) if !d.is_empty() => d,
        _ => format!("Website issue of type {}", issue_type),
    };

    Issue {
        issue_type,
        severity,
        description,
        location: raw.location.filter(|s| !s.is_empty()),
        fix: raw.fix,
        details: raw.details.filter(|s| !s.is_empty()),
        url: raw.url.filter(|s| !s.is_empty()),
        value: raw.value.filter(|s| !s.is_empty()),
    }
}

/// Synthesized identifiers stay unique so distinct anonymous findings are
/// never collapsed together downstream.
fn synthesize_type() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("generic-issue-{}-{}", millis, suffix)
}

/// Field-by-field lenient extraction: a wrong-typed field is treated the
/// same as a missing one instead of failing the whole entry.
fn raw_from_value(value: &Value) -> RawIssue {
    let string_field = |key: &str| -> Option<String> {
        value.get(key).and_then(Value::as_str).map(str::to_string)
    };

    RawIssue {
        issue_type: string_field("type"),
        severity: string_field("severity"),
        description: string_field("description"),
        location: string_field("location"),
        fix: value
            .get("fix")
            .cloned()
            .and_then(|f| serde_json::from_value(f).ok()),
        details: string_field("details"),
        url: string_field("url"),
        value: string_field("value"),
    }
}
