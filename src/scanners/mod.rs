// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Check Units
 * Built-in heuristic checks. Each unit fetches what it needs through the
 * shared HTTP client, catches its own transport failures, and reports
 * findings through the common CheckResult interface.
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::config::ScannerConfig;
use crate::http_client::HttpClient;
use crate::orchestrator::{CheckUnit, ScanOrchestrator};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use url::Url;

pub mod compliance;
pub mod exposed_files;
pub mod headers;
pub mod owasp;
pub mod performance;
pub mod secrets;
pub mod seo;
pub mod ssl;
pub mod stripe;
pub mod supabase;
pub mod wordpress;

pub use compliance::ComplianceCheck;
pub use exposed_files::ExposedFilesCheck;
pub use headers::HeadersCheck;
pub use owasp::OwaspCheck;
pub use performance::PerformanceCheck;
pub use secrets::SecretsCheck;
pub use seo::SeoCheck;
pub use ssl::SslCheck;
pub use stripe::StripeCheck;
pub use supabase::SupabaseCheck;
pub use wordpress::WordPressCheck;

/// The built-in battery, in the fixed order issues appear in scan records
pub fn default_units(http_client: Arc<HttpClient>) -> Vec<Arc<dyn CheckUnit>> {
    vec![
        Arc::new(SslCheck::new(Arc::clone(&http_client))),
        Arc::new(HeadersCheck::new(Arc::clone(&http_client))),
        Arc::new(ExposedFilesCheck::new(Arc::clone(&http_client))),
        Arc::new(OwaspCheck::new(Arc::clone(&http_client))),
        Arc::new(StripeCheck::new(Arc::clone(&http_client))),
        Arc::new(WordPressCheck::new(Arc::clone(&http_client))),
        Arc::new(SecretsCheck::new(Arc::clone(&http_client))),
        Arc::new(SupabaseCheck::new(Arc::clone(&http_client))),
        Arc::new(SeoCheck::new(Arc::clone(&http_client))),
        Arc::new(PerformanceCheck::new(Arc::clone(&http_client))),
        Arc::new(ComplianceCheck::new(http_client)),
    ]
}

/// Orchestrator preloaded with the default battery
pub fn default_orchestrator(config: &ScannerConfig) -> Result<ScanOrchestrator> {
    let http_client = Arc::new(HttpClient::new(config)?);
    let mut orchestrator = ScanOrchestrator::new(config);
    for unit in default_units(http_client) {
        orchestrator.register(unit);
    }
    Ok(orchestrator)
}

/// `scheme://host[:port]` of a target URL, with path and query dropped.
/// Units probing well-known paths resolve them against this base.
pub(crate) fn base_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let mut base = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        base.push_str(&format!(":{}", port));
    }
    Some(base)
}

pub(crate) fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

static SCRIPT_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<script[^>]*\ssrc=["']([^"']+)["']"#).unwrap());
static INLINE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script[^>]*>(.*?)</script>").unwrap());

/// Non-empty inline `<script>` bodies in document order
pub(crate) fn inline_scripts(html: &str) -> Vec<&str> {
    INLINE_SCRIPT
        .captures_iter(html)
        .filter_map(|capture| capture.get(1).map(|m| m.as_str()))
        .filter(|body| !body.trim().is_empty())
        .collect()
}

/// Resolve script src attributes into absolute same-origin URLs; foreign
/// origins are someone else's secrets to leak
pub(crate) fn same_origin_scripts(html: &str, base: &str) -> Vec<String> {
    SCRIPT_SRC
        .captures_iter(html)
        .filter_map(|capture| capture.get(1).map(|m| m.as_str()))
        .filter_map(|src| {
            if src.starts_with("//") {
                None
            } else if let Some(stripped) = src.strip_prefix(base) {
                Some(format!("{}{}", base, stripped))
            } else if src.starts_with('/') {
                Some(format!("{}{}", base, src))
            } else if src.starts_with("http") {
                None
            } else {
                Some(format!("{}/{}", base, src))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_strips_path_and_query() {
        assert_eq!(
            base_url("https://example.com/deep/path?q=1").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            base_url("http://example.com:8080/x").as_deref(),
            Some("http://example.com:8080")
        );
        assert_eq!(base_url("not a url"), None);
    }

    #[test]
    fn test_default_battery_order_is_fixed() {
        let config = ScannerConfig::default();
        let client = Arc::new(HttpClient::new(&config).unwrap());
        let names: Vec<&str> = default_units(client).iter().map(|u| u.name()).collect();
        assert_eq!(
            names,
            vec![
                "ssl",
                "headers",
                "exposedFiles",
                "owasp",
                "stripe",
                "wordpress",
                "secrets",
                "supabase",
                "seo",
                "performance",
                "compliance"
            ]
        );
    }

    #[test]
    fn test_same_origin_script_resolution() {
        let html = r#"
            <script src="/js/app.js"></script>
            <script src="vendor.js"></script>
            <script src="https://cdn.example.org/lib.js"></script>
            <script src="//cdn.example.org/lib2.js"></script>
        "#;
        let scripts = same_origin_scripts(html, "https://example.com");
        assert_eq!(
            scripts,
            vec![
                "https://example.com/js/app.js",
                "https://example.com/vendor.js"
            ]
        );
    }

    #[test]
    fn test_inline_scripts_skip_src_and_empty_tags() {
        let html = r#"
            <script src="/app.js"></script>
            <script>var token = 1;</script>
            <script>  </script>
        "#;
        let bodies = inline_scripts(html);
        assert_eq!(bodies, vec!["var token = 1;"]);
    }
}
