// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Compliance Check
 * Legal-surface review of the landing page: privacy policy and terms links,
 * tracking scripts versus consent tooling, and reachable contact details
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
use tracing::info;

/// Trackers that require consent under GDPR/ePrivacy before they fire
const TRACKING_SIGNATURES: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "gtag(",
    "fbq(",
    "facebook.net/en_US/fbevents",
    "hotjar.com",
    "doubleclick.net",
];

/// Consent-management platforms and home-grown banner markers
const CONSENT_SIGNATURES: &[&str] = &[
    "cookiebot",
    "onetrust",
    "usercentrics",
    "cookieyes",
    "consentmanager",
    "cookie-consent",
    "cookieconsent",
    "consent-banner",
];

const PRIVACY_LINK_HINTS: &[&str] = &["privacy", "tietosuoja", "datenschutz"];
const TERMS_LINK_HINTS: &[&str] = &["terms", "tos", "käyttöehdot", "agb"];

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap()
});
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+\d{1,3}[\s.-]?)?\(?\d{2,4}\)?[\s.-]?\d{3,4}[\s.-]?\d{3,4}").unwrap());
static HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a[^>]*href=["']([^"']+)["']"#).unwrap());

pub struct ComplianceCheck {
    http_client: Arc<HttpClient>,
}

impl ComplianceCheck {
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

        let issues = analyze_page(&response.body);
        info!(
            "[Compliance] Completed with {} findings for {}",
            issues.len(),
            base
        );
        CheckResult::completed(issues)
    }
}

fn analyze_page(html: &str) -> Vec<RawIssue> {
    let lower = html.to_lowercase();
    let mut issues = Vec::new();

    check_legal_links(&lower, &mut issues);
    check_tracking_consent(&lower, &mut issues);
    check_contact_information(html, &lower, &mut issues);

    issues
}

fn link_targets(lower_html: &str) -> Vec<&str> {
    HREF.captures_iter(lower_html)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

fn check_legal_links(lower_html: &str, issues: &mut Vec<RawIssue>) {
    let links = link_targets(lower_html);
    let has_link = |hints: &[&str]| {
        links
            .iter()
            .any(|href| hints.iter().any(|hint| href.contains(hint)))
    };

    if !has_link(PRIVACY_LINK_HINTS) {
        issues.push(
            RawIssue::new(
                "missing-privacy-policy",
                Severity::Medium,
                "No privacy policy link found on the landing page",
            )
            .with_fix(
                "Link a privacy policy",
                "GDPR requires a reachable privacy policy wherever personal data is collected. Link it from every page footer.",
                None,
            ),
        );
    }
    if !has_link(TERMS_LINK_HINTS) {
        issues.push(RawIssue::new(
            "missing-terms-of-service",
            Severity::Low,
            "No terms of service link found on the landing page",
        ));
    }
}

fn check_tracking_consent(lower_html: &str, issues: &mut Vec<RawIssue>) {
    let trackers: Vec<&str> = TRACKING_SIGNATURES
        .iter()
        .filter(|sig| lower_html.contains(&sig.to_lowercase()))
        .copied()
        .collect();
    let has_consent_tooling = CONSENT_SIGNATURES
        .iter()
        .any(|sig| lower_html.contains(sig));

    if !trackers.is_empty() && !has_consent_tooling {
        issues.push(
            RawIssue::new(
                "tracking-without-consent",
                Severity::Medium,
                &format!(
                    "Tracking scripts load without a consent mechanism: {}",
                    trackers.join(", ")
                ),
            )
            .with_fix(
                "Gate trackers behind consent",
                "Analytics and advertising scripts must not fire before the visitor consents. Wire them through a consent-management platform.",
                None,
            ),
        );
    }
    if !has_consent_tooling && trackers.is_empty() && lower_html.contains("cookie") {
        // cookies mentioned but no banner tooling detected
        issues.push(RawIssue::new(
            "missing-consent-banner",
            Severity::Low,
            "Page references cookies but no consent banner was detected",
        ));
    }
}

fn check_contact_information(html: &str, lower_html: &str, issues: &mut Vec<RawIssue>) {
    let has_email = EMAIL.is_match(html);
    let has_phone = PHONE.is_match(html);
    let has_contact_link = link_targets(lower_html)
        .iter()
        .any(|href| href.contains("contact") || href.contains("yhteystiedot"));

    if !has_email && !has_phone && !has_contact_link {
        issues.push(RawIssue::new(
            "insufficient-contact-information",
            Severity::Low,
            "No email address, phone number or contact page link found",
        ));
    }
}

impl CheckUnit for ComplianceCheck {
    fn name(&self) -> &'static str {
        "compliance"
    }

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>> {
        Box::pin(async move { Ok(self.run(url).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(issues: &[RawIssue]) -> Vec<&str> {
        issues
            .iter()
            .filter_map(|i| i.issue_type.as_deref())
            .collect()
    }

    #[test]
    fn test_compliant_page_is_clean() {
        let html = r#"<body>
            <a href="/privacy-policy">Privacy</a>
            <a href="/terms">Terms</a>
            <a href="/contact">Contact us</a>
        </body>"#;
        assert!(analyze_page(html).is_empty());
    }

    #[test]
    fn test_missing_legal_links() {
        let issues = analyze_page(r#"<body><a href="/contact">Contact</a></body>"#);
        let t = types(&issues);
        assert!(t.contains(&"missing-privacy-policy"));
        assert!(t.contains(&"missing-terms-of-service"));
    }

    #[test]
    fn test_tracking_without_consent() {
        let html = r#"<body>
            <a href="/privacy">p</a><a href="/terms">t</a><a href="/contact">c</a>
            <script src="https://www.googletagmanager.com/gtag/js"></script>
        </body>"#;
        let issues = analyze_page(html);
        assert_eq!(types(&issues), vec!["tracking-without-consent"]);
        assert!(issues[0]
            .description
            .as_deref()
            .unwrap()
            .contains("googletagmanager.com"));
    }

    #[test]
    fn test_consent_tooling_suppresses_tracking_issue() {
        let html = r#"<body>
            <a href="/privacy">p</a><a href="/terms">t</a><a href="/contact">c</a>
            <script src="https://www.googletagmanager.com/gtag/js"></script>
            <script src="https://consent.cookiebot.com/uc.js"></script>
        </body>"#;
        assert!(analyze_page(html).is_empty());
    }

    #[test]
    fn test_cookie_mention_without_banner() {
        let html = r#"<body>
            <a href="/privacy">p</a><a href="/terms">t</a><a href="/contact">c</a>
            <p>We use cookies to improve your experience.</p>
        </body>"#;
        assert_eq!(types(&analyze_page(html)), vec!["missing-consent-banner"]);
    }

    #[test]
    fn test_email_counts_as_contact_information() {
        let html = r#"<body>
            <a href="/privacy">p</a><a href="/terms">t</a>
            <p>Reach us at hello@example.com</p>
        </body>"#;
        assert!(analyze_page(html).is_empty());
    }
}
