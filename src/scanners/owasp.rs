// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - OWASP Check
 * Heuristic pass over the landing page for common OWASP Top-10 exposure:
 * unvalidated forms, missing CSRF tokens, injectable URL parameters,
 * outdated JavaScript libraries, and open directory listings
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
use url::Url;

/// Query parameters that commonly reach SQL, file or redirect sinks
const INJECTABLE_PARAM_NAMES: &[&str] = &[
    "id", "page_id", "user_id", "file", "path", "query", "search", "load", "include",
    "url", "redirect", "return", "next", "src", "dest", "destination", "redir",
    "data", "reference", "ref",
];

/// Only these two are probed; more would look like a crawl
const LISTING_DIRS: &[&str] = &["/images", "/uploads"];

const LISTING_SIGNATURES: &[&str] = &[
    "Index of /",
    "Directory Listing",
    "<title>Index of",
    "Parent Directory</a>",
];

struct LibraryPattern {
    name: &'static str,
    regex: &'static Lazy<Regex>,
    /// Version-prefix match against known-vulnerable release lines
    vulnerable_prefixes: &'static [&'static str],
}

static JQUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)jquery[.-](\d+\.\d+\.\d+)").unwrap());
static BOOTSTRAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)bootstrap[.-](\d+\.\d+\.\d+)").unwrap());
static ANGULAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)angular[.-](\d+\.\d+\.\d+)").unwrap());
static VUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)vue[.-](\d+\.\d+\.\d+)").unwrap());
static LODASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)lodash[.-](\d+\.\d+\.\d+)").unwrap());

static LIBRARY_PATTERNS: &[LibraryPattern] = &[
    LibraryPattern {
        name: "jQuery",
        regex: &JQUERY,
        vulnerable_prefixes: &[
            "1.0.", "1.1.", "1.2.", "1.3.", "1.4.", "1.5.", "1.6.", "1.7.", "1.8.", "1.9.",
            "1.10.", "1.11.0", "1.12.0", "2.0.", "2.1.0", "2.1.1", "2.1.2", "2.1.3",
        ],
    },
    LibraryPattern {
        name: "Bootstrap",
        regex: &BOOTSTRAP,
        vulnerable_prefixes: &[
            "2.0.", "2.1.", "2.2.", "2.3.", "3.0.", "3.1.", "3.2.", "3.3.0", "3.3.1", "3.3.2",
            "3.3.3", "3.3.4", "3.3.5", "3.3.6", "3.3.7",
        ],
    },
    LibraryPattern {
        name: "Angular",
        regex: &ANGULAR,
        vulnerable_prefixes: &[
            "1.0.", "1.1.", "1.2.", "1.3.", "1.4.", "1.5.", "1.6.0", "1.6.1", "1.6.2", "1.6.3",
        ],
    },
    LibraryPattern {
        name: "Vue.js",
        regex: &VUE,
        vulnerable_prefixes: &["1.0.", "2.0.", "2.1.", "2.2.", "2.3.", "2.4.", "2.5.0", "2.5.1"],
    },
    LibraryPattern {
        name: "Lodash",
        regex: &LODASH,
        vulnerable_prefixes: &[
            "0.", "1.", "2.", "3.", "4.0.", "4.1.", "4.2.", "4.3.", "4.4.", "4.5.", "4.6.",
            "4.7.", "4.8.", "4.9.", "4.10.", "4.11.", "4.12.", "4.13.",
        ],
    },
];

static FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<form[^>]*>(.*?)</form>").unwrap());
static NONCE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"nonce=["'][a-zA-Z0-9]+["']"#).unwrap());

pub struct OwaspCheck {
    http_client: Arc<HttpClient>,
}

impl OwaspCheck {
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
        let mut issues = Vec::new();

        inspect_forms(&html, &mut issues);
        inspect_url_params(url, &mut issues);
        inspect_libraries(&html, &mut issues);

        if let Some(listing) = self.probe_directory_listing(&base).await {
            issues.push(listing);
        }

        info!("[OWASP] Completed, found {} findings", issues.len());
        CheckResult::completed(issues)
    }

    /// Probe well-known upload directories; report the first open listing only
    async fn probe_directory_listing(&self, base: &str) -> Option<RawIssue> {
        for dir in LISTING_DIRS {
            let dir_url = format!("{}{}", base, dir);
            let response = match self.http_client.get(&dir_url).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("[OWASP] Directory probe failed for {}: {}", dir_url, e);
                    continue;
                }
            };

            let listed = response.status_code == 200
                && LISTING_SIGNATURES.iter().any(|sig| response.body.contains(sig));
            if listed {
                return Some(
                    RawIssue::new(
                        "directory-listing",
                        Severity::Medium,
                        &format!("Directory listing is enabled for {}", dir),
                    )
                    .with_location(dir_url)
                    .with_fix(
                        "Disable Directory Listing",
                        "Disable directory listing in your web server configuration.",
                        Some("# For Apache, add to .htaccess\nOptions -Indexes\n\n# For Nginx\nautoindex off;"),
                    ),
                );
            }
        }
        None
    }
}

fn inspect_forms(html: &str, issues: &mut Vec<RawIssue>) {
    let forms: Vec<&str> = FORM
        .captures_iter(html)
        .filter_map(|capture| capture.get(0).map(|m| m.as_str()))
        .collect();
    if forms.is_empty() {
        return;
    }

    let has_input_validation = html.contains("pattern=")
        || html.contains(" required")
        || html.contains(" maxlength=")
        || html.contains("minlength=");
    let has_anti_xss = html.contains("htmlspecialchars")
        || html.contains("escapeHTML")
        || html.contains("sanitize")
        || html.contains("escape(")
        || html.contains(".encode");

    if !has_input_validation && !has_anti_xss {
        issues.push(
            RawIssue::new(
                "potential-xss",
                Severity::Medium,
                "Forms detected without apparent input validation",
            )
            .with_fix(
                "Implement Input Validation",
                "Add client-side validation to forms and ensure server-side validation and output escaping is implemented.",
                Some(r#"<input type="text" name="username" pattern="[A-Za-z0-9]+" required maxlength="50">"#),
            ),
        );
    }

    let lower = html.to_lowercase();
    let has_csrf_token = lower.contains("csrf")
        || lower.contains("_token")
        || lower.contains("authenticity_token")
        || lower.contains("anti-forgery")
        || lower.contains("xsrf")
        || NONCE_ATTR.is_match(html);
    let has_post_form = forms
        .iter()
        .any(|form| {
            let form = form.to_lowercase();
            form.contains(r#"method="post""#) || form.contains("method='post'")
        });

    if !has_csrf_token && has_post_form {
        issues.push(
            RawIssue::new(
                "potential-csrf",
                Severity::Medium,
                "Forms may lack CSRF protection",
            )
            .with_fix(
                "Add CSRF Protection",
                "Implement CSRF tokens in all forms to prevent cross-site request forgery attacks.",
                Some(r#"<input type="hidden" name="csrf_token" value="UNIQUE_TOKEN_HERE">"#),
            ),
        );
    }
}

fn inspect_url_params(url: &str, issues: &mut Vec<RawIssue>) {
    let injectable = injectable_params(url);
    if injectable.is_empty() {
        return;
    }
    issues.push(
        RawIssue::new(
            "injectable-params",
            Severity::Medium,
            &format!(
                "URL contains potentially injectable parameters: {}",
                injectable.join(", ")
            ),
        )
        .with_fix(
            "Validate URL Parameters",
            "Ensure all URL parameters are validated and sanitized on the server side.",
            None,
        ),
    );
}

fn injectable_params(url: &str) -> Vec<String> {
    let Ok(parsed) = Url::parse(url) else {
        return Vec::new();
    };
    parsed
        .query_pairs()
        .filter(|(name, _)| {
            let name = name.to_lowercase();
            INJECTABLE_PARAM_NAMES.contains(&name.as_str())
        })
        .map(|(name, _)| name.into_owned())
        .collect()
}

fn inspect_libraries(html: &str, issues: &mut Vec<RawIssue>) {
    for lib in LIBRARY_PATTERNS {
        let Some(capture) = lib.regex.captures(html) else {
            continue;
        };
        let Some(version) = capture.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let vulnerable = lib
            .vulnerable_prefixes
            .iter()
            .any(|prefix| version.starts_with(prefix));
        if vulnerable {
            issues.push(
                RawIssue::new(
                    "vulnerable-library",
                    Severity::Medium,
                    &format!(
                        "Potentially vulnerable JavaScript library detected: {} {}",
                        lib.name, version
                    ),
                )
                .with_value(format!("{} {}", lib.name, version))
                .with_fix(
                    "Update JavaScript Library",
                    &format!(
                        "Update {} to the latest version to fix known security vulnerabilities.",
                        lib.name
                    ),
                    None,
                ),
            );
        }
    }
}

impl CheckUnit for OwaspCheck {
    fn name(&self) -> &'static str {
        "owasp"
    }

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>> {
        Box::pin(async move { Ok(self.run(url).await) })
    }
}
