// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Security Headers Check
 * Tests for missing or misconfigured HTTP security headers and insecure
 * cookie attributes
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::errors::ScannerResult;
use crate::http_client::{HttpClient, HttpResponse};
use crate::orchestrator::CheckUnit;
use crate::types::{CheckResult, RawIssue, Severity};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::info;

/// One year, the minimum recommended HSTS max-age
const HSTS_MIN_MAX_AGE: u64 = 31_536_000;

static HSTS_MAX_AGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"max-age=(\d+)").unwrap());

pub struct HeadersCheck {
    http_client: Arc<HttpClient>,
}

impl HeadersCheck {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    async fn run(&self, url: &str) -> CheckResult {
        info!("[Headers] Scanning: {}", url);

        let response = match self.http_client.get(url).await {
            Ok(response) => response,
            Err(e) => return CheckResult::failed(e.to_string()),
        };

        let is_https = url.starts_with("https:");
        let mut issues = Vec::new();

        if response.header("content-security-policy").is_none() {
            issues.push(
                RawIssue::new(
                    "missing-csp",
                    Severity::Medium,
                    "Content-Security-Policy header is missing",
                )
                .with_fix(
                    "Add Content-Security-Policy header",
                    "Content-Security-Policy helps prevent XSS attacks by specifying which sources of content are allowed.",
                    Some("Content-Security-Policy: default-src 'self'; script-src 'self' trusted-scripts.com;"),
                ),
            );
        }

        if response.header("x-frame-options").is_none() {
            issues.push(
                RawIssue::new(
                    "missing-x-frame-options",
                    Severity::Medium,
                    "X-Frame-Options header is missing",
                )
                .with_fix(
                    "Add X-Frame-Options header",
                    "X-Frame-Options prevents your site from being embedded in frames on other sites, protecting against clickjacking attacks.",
                    Some("X-Frame-Options: SAMEORIGIN"),
                ),
            );
        }

        if response.header("x-content-type-options").is_none() {
            issues.push(
                RawIssue::new(
                    "missing-x-content-type-options",
                    Severity::Low,
                    "X-Content-Type-Options header is missing",
                )
                .with_fix(
                    "Add X-Content-Type-Options header",
                    "X-Content-Type-Options prevents MIME type sniffing which can lead to security vulnerabilities.",
                    Some("X-Content-Type-Options: nosniff"),
                ),
            );
        }

        self.check_hsts(&response, is_https, &mut issues);

        if response.header("x-xss-protection").is_none() {
            issues.push(
                RawIssue::new(
                    "missing-x-xss-protection",
                    Severity::Low,
                    "X-XSS-Protection header is missing",
                )
                .with_fix(
                    "Add X-XSS-Protection header",
                    "X-XSS-Protection enables browser's built-in XSS filtering.",
                    Some("X-XSS-Protection: 1; mode=block"),
                ),
            );
        }

        if response.header("referrer-policy").is_none() {
            issues.push(
                RawIssue::new(
                    "missing-referrer-policy",
                    Severity::Low,
                    "Referrer-Policy header is missing",
                )
                .with_fix(
                    "Add Referrer-Policy header",
                    "Referrer-Policy controls how much referrer information is included with requests.",
                    Some("Referrer-Policy: strict-origin-when-cross-origin"),
                ),
            );
        }

        if let Some(set_cookie) = response.header("set-cookie") {
            self.check_cookie_security(set_cookie, is_https, &mut issues);
        }

        info!("[Headers] Completed scan, found {} issues", issues.len());
        CheckResult::completed(issues)
    }

    /// HSTS severity depends on the scheme: missing HSTS on an HTTP-only
    /// site is a smaller problem than the missing HTTPS itself
    fn check_hsts(&self, response: &HttpResponse, is_https: bool, issues: &mut Vec<RawIssue>) {
        match response.header("strict-transport-security") {
            None => {
                let severity = if is_https { Severity::Medium } else { Severity::Low };
                issues.push(
                    RawIssue::new(
                        "missing-hsts",
                        severity,
                        "Strict-Transport-Security header is missing",
                    )
                    .with_fix(
                        "Add Strict-Transport-Security header",
                        "HSTS ensures that browsers always use HTTPS, even if a user tries to use HTTP.",
                        Some("Strict-Transport-Security: max-age=31536000; includeSubDomains"),
                    ),
                );
            }
            Some(value) => {
                let max_age = HSTS_MAX_AGE
                    .captures(value)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<u64>().ok());

                if matches!(max_age, Some(age) if age < HSTS_MIN_MAX_AGE) {
                    issues.push(
                        RawIssue::new(
                            "weak-hsts",
                            Severity::Low,
                            "HSTS max-age is less than recommended (1 year)",
                        )
                        .with_fix(
                            "Increase HSTS max-age",
                            "For better security, set HSTS max-age to at least 1 year (31536000 seconds).",
                            Some("Strict-Transport-Security: max-age=31536000; includeSubDomains"),
                        ),
                    );
                }
            }
        }
    }

    fn check_cookie_security(&self, set_cookie: &str, is_https: bool, issues: &mut Vec<RawIssue>) {
        let lower = set_cookie.to_lowercase();
        let cookie_name = set_cookie.split('=').next().unwrap_or("cookie").trim();

        if is_https && !lower.contains("secure") {
            issues.push(
                RawIssue::new(
                    "cookie-missing-secure",
                    Severity::Medium,
                    "Cookie is set without the Secure attribute",
                )
                .with_location(cookie_name)
                .with_fix(
                    "Add Secure attribute to cookies",
                    "Cookies without the Secure attribute can be transmitted over unencrypted connections.",
                    Some("Set-Cookie: session=...; Secure; HttpOnly; SameSite=Lax"),
                ),
            );
        }

        if !lower.contains("httponly") {
            issues.push(
                RawIssue::new(
                    "cookie-missing-httponly",
                    Severity::Medium,
                    "Cookie is set without the HttpOnly attribute",
                )
                .with_location(cookie_name)
                .with_fix(
                    "Add HttpOnly attribute to cookies",
                    "Cookies without HttpOnly are readable by JavaScript and can be stolen through XSS.",
                    Some("Set-Cookie: session=...; Secure; HttpOnly; SameSite=Lax"),
                ),
            );
        }

        if !lower.contains("samesite") {
            issues.push(
                RawIssue::new(
                    "cookie-missing-samesite",
                    Severity::Low,
                    "Cookie is set without a SameSite attribute",
                )
                .with_location(cookie_name),
            );
        }
    }
}

impl CheckUnit for HeadersCheck {
    fn name(&self) -> &'static str {
        "headers"
    }

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>> {
        Box::pin(async move { Ok(self.run(url).await) })
    }
}
