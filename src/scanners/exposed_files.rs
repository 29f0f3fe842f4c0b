// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Exposed Files Check
 * Probes well-known sensitive paths (environment files, VCS metadata,
 * backups, server config) that should never be reachable over HTTP
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::errors::ScannerResult;
use crate::http_client::HttpClient;
use crate::orchestrator::CheckUnit;
use crate::types::{CheckResult, RawIssue, Severity};
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Parallel probes per target; enough to finish fast without hammering
const PROBE_CONCURRENCY: usize = 5;

struct ProbeTarget {
    path: &'static str,
    severity: Severity,
    description: &'static str,
    fix_title: &'static str,
    fix_description: &'static str,
}

const PROBE_TARGETS: &[ProbeTarget] = &[
    ProbeTarget {
        path: "/.env",
        severity: Severity::Critical,
        description: "Environment configuration file exposed",
        fix_title: "Secure Environment Files",
        fix_description: "Environment files contain API keys, database credentials and secrets. They should never be accessible via web requests; block them in the web server config or move them outside the web root.",
    },
    ProbeTarget {
        path: "/.git/config",
        severity: Severity::Critical,
        description: "Git configuration exposed",
        fix_title: "Block Git Directory Access",
        fix_description: "Git directories contain your entire source history, including deleted files and potentially sensitive commits. Deny access to /.git at the web server, and avoid deploying it at all.",
    },
    ProbeTarget {
        path: "/.git/HEAD",
        severity: Severity::Critical,
        description: "Git repository exposed",
        fix_title: "Block Git Directory Access",
        fix_description: "An exposed .git directory lets anyone reconstruct your source tree. Deny access at the web server level.",
    },
    ProbeTarget {
        path: "/wp-config.php",
        severity: Severity::Critical,
        description: "WordPress configuration file accessible",
        fix_title: "Protect wp-config.php",
        fix_description: "wp-config.php holds database credentials and secret keys. Ensure the server executes it as PHP rather than serving its source, and deny direct requests to it.",
    },
    ProbeTarget {
        path: "/config.php",
        severity: Severity::Critical,
        description: "PHP configuration file accessible",
        fix_title: "Protect configuration files",
        fix_description: "Configuration files should never be served as plain text. Deny direct access at the web server.",
    },
    ProbeTarget {
        path: "/.htaccess",
        severity: Severity::Medium,
        description: "Apache configuration file exposed",
        fix_title: "Block .htaccess access",
        fix_description: ".htaccess reveals rewrite rules and protected paths. Apache denies it by default; restore that rule.",
    },
    ProbeTarget {
        path: "/phpinfo.php",
        severity: Severity::Medium,
        description: "PHP info page exposed",
        fix_title: "Remove phpinfo pages",
        fix_description: "phpinfo() output reveals versions, paths and loaded modules attackers use to pick exploits. Remove the file from production.",
    },
    ProbeTarget {
        path: "/credentials.json",
        severity: Severity::Critical,
        description: "Credentials file exposed",
        fix_title: "Remove credential files from the web root",
        fix_description: "Credential files must live outside the web root and be loaded server-side only.",
    },
    ProbeTarget {
        path: "/backup.sql",
        severity: Severity::Critical,
        description: "Database backup exposed",
        fix_title: "Remove backups from the web root",
        fix_description: "Database dumps contain your full data set. Store backups outside the web root with restricted permissions.",
    },
    ProbeTarget {
        path: "/backup.zip",
        severity: Severity::Critical,
        description: "Backup archive exposed",
        fix_title: "Remove backups from the web root",
        fix_description: "Site archives frequently contain configuration and credentials. Store backups outside the web root.",
    },
    ProbeTarget {
        path: "/.DS_Store",
        severity: Severity::Low,
        description: "macOS directory metadata exposed",
        fix_title: "Block .DS_Store files",
        fix_description: ".DS_Store files leak directory listings. Exclude them from deployment and deny them at the web server.",
    },
];

/// Disallow rules that reveal more than they protect
const SENSITIVE_ROBOTS_RULES: &[&str] = &[
    "disallow: /admin",
    "disallow: /wp-admin",
    "disallow: /backup",
    "disallow: /private",
    "disallow: /config",
    "disallow: /api",
    "disallow: /test",
    "disallow: /dev",
    "disallow: /staging",
];

pub struct ExposedFilesCheck {
    http_client: Arc<HttpClient>,
}

impl ExposedFilesCheck {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    async fn run(&self, url: &str) -> CheckResult {
        let Some(base) = super::base_url(url) else {
            return CheckResult::failed(format!("Cannot resolve base URL from {}", url));
        };

        info!("[Files] Probing {} sensitive paths on {}", PROBE_TARGETS.len(), base);

        // buffered (not buffer_unordered) keeps findings in table order
        let probes: Vec<_> = PROBE_TARGETS
            .iter()
            .map(|target| self.probe(&base, target))
            .collect();
        let mut issues: Vec<RawIssue> = stream::iter(probes)
            .buffered(PROBE_CONCURRENCY)
            .filter_map(|found| async move { found })
            .collect()
            .await;

        if let Some(robots_issue) = self.check_robots(&base).await {
            issues.push(robots_issue);
        }

        info!("[Files] Completed, found {} exposed paths", issues.len());
        CheckResult::completed(issues)
    }

    async fn probe(&self, base: &str, target: &ProbeTarget) -> Option<RawIssue> {
        let url = format!("{}{}", base, target.path);
        let response = match self.http_client.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                // unreachable is the good outcome here
                debug!("[Files] {} not accessible: {}", target.path, e);
                return None;
            }
        };

        if response.status_code != 200 || response.body.is_empty() {
            return None;
        }

        // Soft-404 guard: SPA servers answer every path with the app shell
        if looks_like_html_page(&response.body) {
            debug!("[Files] {} returned an HTML page, ignoring", target.path);
            return None;
        }

        Some(
            RawIssue::new(
                &format!("exposed-{}", slug(target.path)),
                target.severity,
                target.description,
            )
            .with_location(target.path)
            .with_fix(target.fix_title, target.fix_description, None),
        )
    }

    async fn check_robots(&self, base: &str) -> Option<RawIssue> {
        let response = self
            .http_client
            .get(&format!("{}/robots.txt", base))
            .await
            .ok()?;
        if response.status_code != 200 {
            return None;
        }

        let content = response.body.to_lowercase();
        if SENSITIVE_ROBOTS_RULES.iter().any(|rule| content.contains(rule)) {
            return Some(
                RawIssue::new(
                    "sensitive-robots-txt",
                    Severity::Low,
                    "Robots.txt reveals potentially sensitive directory paths",
                )
                .with_location("/robots.txt")
                .with_fix(
                    "Review and Optimize Robots.txt",
                    "Robots.txt disallow rules naming admin or backup paths point attackers straight at them. Protect those paths with access control instead of hiding them in robots.txt.",
                    None,
                ),
            );
        }
        None
    }
}

fn slug(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

fn looks_like_html_page(body: &str) -> bool {
    let head: String = body.chars().take(512).collect::<String>().to_lowercase();
    head.contains("<html") || head.contains("<!doctype html")
}

impl CheckUnit for ExposedFilesCheck {
    fn name(&self) -> &'static str {
        "exposedFiles"
    }

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>> {
        Box::pin(async move { Ok(self.run(url).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("/.env"), "env");
        assert_eq!(slug("/.git/config"), "git-config");
        assert_eq!(slug("/backup.sql"), "backup-sql");
        assert_eq!(slug("/.DS_Store"), "ds-store");
    }

    #[test]
    fn test_html_page_detection() {
        assert!(looks_like_html_page("<!DOCTYPE html><html><head>"));
        assert!(looks_like_html_page("\n  <HTML>"));
        assert!(!looks_like_html_page("DB_PASSWORD=hunter2\nAPI_KEY=abc"));
    }
}
