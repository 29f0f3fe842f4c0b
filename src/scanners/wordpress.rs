// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - WordPress Check
 * Detects WordPress installs and probes the usual hardening gaps: version
 * disclosure, exposed readme and debug log, XML-RPC and login exposure
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
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Latest core release line; anything older gets flagged
const CURRENT_VERSION: (u32, u32, u32) = (6, 6, 0);

static GENERATOR_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=["']generator["'][^>]*content=["']WordPress\s*([0-9.]*)"#)
        .unwrap()
});
static README_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)WordPress.*?Version\s+([0-9.]+)").unwrap());

pub struct WordPressCheck {
    http_client: Arc<HttpClient>,
}

impl WordPressCheck {
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

        if !is_wordpress(&response.body) {
            return CheckResult::completed(Vec::new())
                .with_metadata(json!({ "isWordPress": false }));
        }
        info!("[WordPress] Detected WordPress install at {}", base);

        let mut issues = Vec::new();
        let mut version = generator_version(&response.body);

        if version.is_some() {
            issues.push(RawIssue::new(
                "wp-version-disclosure",
                Severity::Low,
                "WordPress version is publicly disclosed in the meta generator tag",
            ));
        } else {
            version = self.readme_version(&base, &mut issues).await;
        }

        if let Some(ref v) = version {
            if is_outdated(v) {
                issues.push(
                    RawIssue::new(
                        "wp-outdated-version",
                        Severity::Critical,
                        &format!("Outdated WordPress version {} detected", v),
                    )
                    .with_fix(
                        "Update WordPress core",
                        "Outdated core versions carry publicly documented vulnerabilities. Update from Dashboard > Updates or with wp-cli.",
                        Some("wp core update"),
                    ),
                );
            }
        }

        self.check_debug_log(&base, &mut issues).await;
        let xmlrpc_open = self.check_xmlrpc(&base, &mut issues).await;
        self.check_login(&base, xmlrpc_open, &mut issues).await;

        let metadata = match version {
            Some(v) => json!({ "isWordPress": true, "version": v }),
            None => json!({ "isWordPress": true }),
        };
        CheckResult::completed(issues).with_metadata(metadata)
    }

    /// readme.html both leaks the version and should not be public at all
    async fn readme_version(&self, base: &str, issues: &mut Vec<RawIssue>) -> Option<String> {
        let readme_url = format!("{}/readme.html", base);
        let response = self.http_client.get(&readme_url).await.ok()?;
        if response.status_code != 200 {
            return None;
        }
        let version = README_VERSION
            .captures(&response.body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())?;

        issues.push(
            RawIssue::new(
                "wp-exposed-readme",
                Severity::Medium,
                "WordPress readme.html file is publicly accessible",
            )
            .with_location(readme_url)
            .with_fix(
                "Block access to readme.html",
                "The readme reveals the installed WordPress version. Deny access to it in the web server configuration.",
                Some("<Files readme.html>\n  Require all denied\n</Files>"),
            ),
        );
        Some(version)
    }

    async fn check_debug_log(&self, base: &str, issues: &mut Vec<RawIssue>) {
        let log_url = format!("{}/wp-content/debug.log", base);
        if let Ok(response) = self.http_client.get(&log_url).await {
            if response.status_code == 200 && !response.body.trim().is_empty() {
                issues.push(
                    RawIssue::new(
                        "wp-exposed-debug-log",
                        Severity::Critical,
                        "WordPress debug log is publicly readable",
                    )
                    .with_location(log_url)
                    .with_fix(
                        "Remove or protect debug.log",
                        "Debug logs leak file paths, queries and sometimes credentials. Disable WP_DEBUG_LOG in production and delete the file.",
                        Some("define('WP_DEBUG_LOG', false);"),
                    ),
                );
            }
        }
    }

    /// A GET against xmlrpc.php answers with its signature refusal when the
    /// endpoint is live; that is enough to know it accepts POSTs
    async fn check_xmlrpc(&self, base: &str, issues: &mut Vec<RawIssue>) -> bool {
        let xmlrpc_url = format!("{}/xmlrpc.php", base);
        let Ok(response) = self.http_client.get(&xmlrpc_url).await else {
            return false;
        };
        let open = matches!(response.status_code, 200 | 405)
            && response.contains("XML-RPC server accepts POST requests only");
        if open {
            issues.push(
                RawIssue::new(
                    "wp-xmlrpc-enabled",
                    Severity::Medium,
                    "XML-RPC endpoint is enabled but may not be needed",
                )
                .with_location(xmlrpc_url)
                .with_fix(
                    "Disable XML-RPC if unused",
                    "XML-RPC enables credential stuffing and amplification attacks. Disable it unless a mobile app or external service needs it.",
                    Some("add_filter('xmlrpc_enabled', '__return_false');"),
                ),
            );
        }
        open
    }

    async fn check_login(&self, base: &str, xmlrpc_open: bool, issues: &mut Vec<RawIssue>) {
        let login_url = format!("{}/wp-login.php", base);
        let Ok(response) = self.http_client.get(&login_url).await else {
            return;
        };
        if response.status_code == 200 && response.contains("wp-login") && xmlrpc_open {
            issues.push(
                RawIssue::new(
                    "wp-login-bruteforce-risk",
                    Severity::Medium,
                    "Login page and XML-RPC are both reachable, enabling amplified brute force",
                )
                .with_location(login_url)
                .with_fix(
                    "Protect the WordPress login",
                    "Limit login attempts and close XML-RPC so a single request cannot test hundreds of credentials.",
                    None,
                ),
            );
        }
    }
}

fn is_wordpress(html: &str) -> bool {
    html.contains("/wp-content/")
        || html.contains("/wp-includes/")
        || GENERATOR_VERSION.is_match(html)
}

fn generator_version(html: &str) -> Option<String> {
    GENERATOR_VERSION
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|v| !v.is_empty())
}

fn is_outdated(version: &str) -> bool {
    let mut parts = version.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    let found = (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    );
    found < CURRENT_VERSION
}

impl CheckUnit for WordPressCheck {
    fn name(&self) -> &'static str {
        "wordpress"
    }

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>> {
        Box::pin(async move { Ok(self.run(url).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wordpress_detection() {
        assert!(is_wordpress(r#"<link href="/wp-content/themes/x/style.css">"#));
        assert!(is_wordpress(r#"<script src="/wp-includes/js/jquery.js"></script>"#));
        assert!(is_wordpress(
            r#"<meta name="generator" content="WordPress 6.4.2">"#
        ));
        assert!(!is_wordpress("<html><body>plain site</body></html>"));
    }

    #[test]
    fn test_generator_version_extraction() {
        assert_eq!(
            generator_version(r#"<meta name="generator" content="WordPress 6.4.2">"#),
            Some("6.4.2".to_string())
        );
        // generator without a version gives detection but no version
        assert_eq!(
            generator_version(r#"<meta name="generator" content="WordPress">"#),
            None
        );
    }

    #[test]
    fn test_version_comparison() {
        assert!(is_outdated("5.9"));
        assert!(is_outdated("6.5.3"));
        assert!(!is_outdated("6.6"));
        assert!(!is_outdated("6.7.1"));
    }

    #[test]
    fn test_readme_version_pattern() {
        let readme = "<h1>WordPress</h1>\n<p>Version 6.2.1</p>";
        let version = README_VERSION
            .captures(readme)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        assert_eq!(version, Some("6.2.1"));
    }
}
