// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Supabase Check
 * Backend-as-a-service review: finds Supabase client initialization in
 * served code, flags exposed anon keys by whether Row-Level Security
 * appears to be in place, and spots query usage without error handling
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::errors::ScannerResult;
use crate::http_client::HttpClient;
use crate::orchestrator::CheckUnit;
use crate::types::{CheckResult, RawIssue, Severity};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

/// External scripts fetched per scan, same bound the credentials pass uses
const MAX_SCRIPTS: usize = 5;

static CREATE_CLIENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"supabase\.createClient\(['"]([^'"]+)['"]\s*,\s*['"]([^'"]+)['"]\)"#).unwrap()
});
static SUPABASE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:from\s+['"]@supabase/supabase-js['"]|supabase-js)"#).unwrap()
});
static SUPABASE_QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.from\(['\x22][a-zA-Z0-9_]+['\x22]\)\s*\.\s*(?:select|insert|update|delete|upsert)\(").unwrap());
static ERROR_HANDLING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:if\s*\(\s*error\s*\)|\.catch\s*\(|try\s*\{)").unwrap());

/// Patterns that suggest Row-Level Security policies exist
static RLS_INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)enableRowLevelSecurity",
        r"(?i)row_level_security",
        r"RLS",
        r"(?i)create\s+policy",
        r"auth\.uid\(\)",
        r"(?i)security\s+invoker",
        r"(?i)security\s+definer",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

pub struct SupabaseCheck {
    http_client: Arc<HttpClient>,
}

#[derive(Default)]
struct Evidence {
    detected: bool,
    anon_keys: Vec<String>,
    has_rls_indicators: bool,
    has_query_client: bool,
    has_error_handling: bool,
}

impl Evidence {
    fn absorb(&mut self, content: &str) {
        if SUPABASE_IMPORT.is_match(content) {
            self.detected = true;
        }
        for capture in CREATE_CLIENT.captures_iter(content) {
            self.detected = true;
            if let Some(key) = capture.get(2).map(|m| m.as_str()) {
                if key.len() > 20 && !self.anon_keys.iter().any(|k| k == key) {
                    self.anon_keys.push(key.to_string());
                }
            }
        }
        if RLS_INDICATORS.iter().any(|p| p.is_match(content)) {
            self.has_rls_indicators = true;
        }
        if SUPABASE_QUERY.is_match(content) {
            self.detected = true;
            self.has_query_client = true;
            if ERROR_HANDLING.is_match(content) {
                self.has_error_handling = true;
            }
        }
    }
}

impl SupabaseCheck {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    async fn run(&self, url: &str) -> CheckResult {
        let Some(base) = super::base_url(url) else {
            return CheckResult::failed(format!("Cannot resolve base URL from {}", url));
        };

        let response = match self.http_client.get(&base).await {
            Ok(response) => response,
            Err(e) => return CheckResult::failed(e.to_string()),
        };

        let html = response.body;
        let mut evidence = Evidence::default();
        evidence.absorb(&html);
        for content in super::inline_scripts(&html) {
            evidence.absorb(content);
        }

        for script_url in super::same_origin_scripts(&html, &base).iter().take(MAX_SCRIPTS) {
            match self.http_client.get(script_url).await {
                Ok(script) if script.status_code == 200 => evidence.absorb(&script.body),
                Ok(_) => {}
                Err(e) => debug!("[Supabase] Failed to fetch {}: {}", script_url, e),
            }
        }

        if !evidence.detected {
            return CheckResult::completed(vec![]);
        }

        info!("[Supabase] Usage detected on {}", base);
        CheckResult::completed(assess(&evidence))
    }
}

fn assess(evidence: &Evidence) -> Vec<RawIssue> {
    let mut issues = Vec::new();

    if !evidence.anon_keys.is_empty() {
        if !evidence.has_rls_indicators {
            issues.push(
                RawIssue::new(
                    "supabase-exposed-anon-key",
                    Severity::Critical,
                    "Supabase public anon key exposed without apparent Row-Level Security (RLS)",
                )
                .with_fix(
                    "Secure Supabase Implementation",
                    "Your Supabase anon key is exposed in client-side code. Without proper Row-Level Security policies, this could allow unauthorized access to your database. Enable RLS for all tables and create appropriate policies.",
                    Some("-- Enable RLS for your tables:\nALTER TABLE your_table ENABLE ROW LEVEL SECURITY;\nCREATE POLICY \"Users read own rows\" ON your_table\n  FOR SELECT USING (auth.uid() = user_id);"),
                ),
            );
        } else {
            issues.push(
                RawIssue::new(
                    "supabase-exposed-anon-key-with-rls",
                    Severity::Low,
                    "Supabase public anon key exposed (RLS indicators detected)",
                )
                .with_fix(
                    "Verify Supabase RLS Policies",
                    "The anon key appears in client-side code and RLS indicators were found. Double-check that all tables carry appropriate policies to prevent unauthorized access.",
                    None,
                ),
            );
        }
    }

    if evidence.has_query_client && !evidence.has_error_handling {
        issues.push(
            RawIssue::new(
                "supabase-missing-error-handling",
                Severity::Medium,
                "Supabase queries without proper error handling detected",
            )
            .with_fix(
                "Add Error Handling to Supabase Queries",
                "Unhandled query errors surface raw failure details to users and hide data problems. Check the error value returned by every query.",
                Some("const { data, error } = await supabase.from('table').select();\nif (error) { /* handle it */ }"),
            ),
        );
    }

    issues
}

impl CheckUnit for SupabaseCheck {
    fn name(&self) -> &'static str {
        "supabase"
    }

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>> {
        Box::pin(async move { Ok(self.run(url).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types_of(issues: &[RawIssue]) -> Vec<&str> {
        issues
            .iter()
            .filter_map(|i| i.issue_type.as_deref())
            .collect()
    }

    #[test]
    fn test_anon_key_without_rls_is_critical() {
        let mut evidence = Evidence::default();
        evidence.absorb(
            r#"const client = supabase.createClient('https://abc.supabase.co', 'eyJhbGciOiJIUzI1NiJ9.payload');"#,
        );
        assert!(evidence.detected);
        let issues = assess(&evidence);
        assert_eq!(types_of(&issues), vec!["supabase-exposed-anon-key"]);
    }

    #[test]
    fn test_anon_key_with_rls_indicators_downgrades() {
        let mut evidence = Evidence::default();
        evidence.absorb(
            r#"const client = supabase.createClient('https://abc.supabase.co', 'eyJhbGciOiJIUzI1NiJ9.payload');"#,
        );
        evidence.absorb("-- ALTER TABLE notes ENABLE ROW_LEVEL_SECURITY; CREATE POLICY p ON notes;");
        let issues = assess(&evidence);
        assert_eq!(types_of(&issues), vec!["supabase-exposed-anon-key-with-rls"]);
    }

    #[test]
    fn test_short_second_argument_is_not_a_key() {
        let mut evidence = Evidence::default();
        evidence.absorb(r#"supabase.createClient('https://abc.supabase.co', 'anon');"#);
        assert!(evidence.detected);
        assert!(evidence.anon_keys.is_empty());
        assert!(assess(&evidence).is_empty());
    }

    #[test]
    fn test_queries_without_error_handling_flagged() {
        let mut evidence = Evidence::default();
        evidence.absorb(r#"const { data } = await db.from("notes").select();"#);
        let issues = assess(&evidence);
        assert_eq!(types_of(&issues), vec!["supabase-missing-error-handling"]);

        let mut handled = Evidence::default();
        handled.absorb(
            r#"const { data, error } = await db.from("notes").select(); if (error) { report(error); }"#,
        );
        assert!(assess(&handled).is_empty());
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let mut evidence = Evidence::default();
        let snippet =
            r#"supabase.createClient('https://abc.supabase.co', 'eyJhbGciOiJIUzI1NiJ9.payload')"#;
        evidence.absorb(snippet);
        evidence.absorb(snippet);
        assert_eq!(evidence.anon_keys.len(), 1);
    }
}
