// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Issue Categorization
 * Keyword-table mapping from issue type to report dimension. This is the
 * collaborator side of the aggregator contract: the core never hardcodes
 * dimension names, it only applies whatever classifier it is given.
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::types::Issue;
use tracing::debug;

const SECURITY_KEYWORDS: &[&str] = &[
    "ssl", "cert", "header", "exposed", "secret", "owasp", "vulnerability", "xss", "csrf",
    "auth", "cookie", "security", "hack", "malware", "injection", "wp-", "wordpress", "hsts",
    "csp", "frame-options", "redirect", "https", "referrer-policy", "x-content-type",
    "x-xss-protection", "missing-csp", "missing-x-frame", "missing-hsts", "missing-x-content",
    "missing-referrer", "stripe", "supabase",
];

const SEO_KEYWORDS: &[&str] = &[
    "seo", "meta", "title", "description", "heading", "schema", "canonical", "robots",
    "sitemap", "alt", "h1", "h2", "h3", "missing-h1", "content-length", "keyword", "search",
    "ranking", "twitter-cards", "open-graph", "structured-data", "breadcrumb", "no-links",
    "duplicate", "analytics", "missing-analytics",
];

const PERFORMANCE_KEYWORDS: &[&str] = &[
    "performance", "speed", "load", "compress", "image", "script", "render", "minif",
    "blocking", "third-party", "css", "javascript", "lazy", "webp", "optimization",
    "bandwidth", "brotli", "preload", "prefetch", "critical-resource", "mobile-optimization",
    "amp", "pwa", "no-images", "render-blocking", "missing-compression", "page-size",
    "caching",
];

const COMPLIANCE_KEYWORDS: &[&str] = &[
    "compliance", "gdpr", "privacy", "accessibility", "legal", "contact", "terms",
    "tracking", "consent", "policy", "a11y", "wcag", "aria", "ada",
];

fn matches_any(issue_type: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| issue_type.contains(k))
}

pub fn is_security_issue(issue_type: &str) -> bool {
    matches_any(&issue_type.to_lowercase(), SECURITY_KEYWORDS)
}

pub fn is_seo_issue(issue_type: &str) -> bool {
    matches_any(&issue_type.to_lowercase(), SEO_KEYWORDS)
}

/// Performance keywords overlap with SEO and security vocabulary
/// ("render-blocking", "missing-compression"); higher-priority categories
/// are checked first to keep the partition unambiguous.
pub fn is_performance_issue(issue_type: &str) -> bool {
    let lower = issue_type.to_lowercase();
    if is_seo_issue(&lower) || is_security_issue(&lower) {
        return false;
    }
    matches_any(&lower, PERFORMANCE_KEYWORDS)
}

pub fn is_compliance_issue(issue_type: &str) -> bool {
    matches_any(&issue_type.to_lowercase(), COMPLIANCE_KEYWORDS)
}

/// Map an issue type to its dimension. Priority order: security, seo,
/// performance, compliance. Unknown types land in security so that nothing
/// a scanner flagged can disappear from the scored report.
pub fn categorize_issue_type(issue_type: &str) -> &'static str {
    let lower = issue_type.to_lowercase();

    if is_security_issue(&lower) {
        return "security";
    }
    if is_seo_issue(&lower) {
        return "seo";
    }
    if is_performance_issue(&lower) {
        return "performance";
    }
    if is_compliance_issue(&lower) {
        return "compliance";
    }

    debug!(issue_type = issue_type, "Unknown issue type, defaulting to security");
    "security"
}

/// The default classifier passed to the dimension aggregator
pub fn classify(issue: &Issue) -> Option<String> {
    Some(categorize_issue_type(&issue.issue_type).to_string())
}
