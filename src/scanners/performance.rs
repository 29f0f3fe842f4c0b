// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Performance Check
 * Load-time and page-weight tiers measured from the landing page fetch,
 * plus compression negotiation, caching headers, render-blocking scripts
 * and image lazy-loading coverage
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::errors::ScannerResult;
use crate::http_client::HttpClient;
use crate::orchestrator::CheckUnit;
use crate::types::{CheckResult, RawIssue, Severity};
use futures::future::BoxFuture;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const LOAD_TIME_CRITICAL: Duration = Duration::from_millis(3000);
const LOAD_TIME_SLOW: Duration = Duration::from_millis(2000);
const LOAD_TIME_MODERATE: Duration = Duration::from_millis(1500);

const PAGE_SIZE_CRITICAL: usize = 3_000_000;
const PAGE_SIZE_WARNING: usize = 1_500_000;

/// Below this many images, lazy-loading coverage is not worth flagging
const LAZY_LOADING_MIN_IMAGES: usize = 5;

pub struct PerformanceCheck {
    http_client: Arc<HttpClient>,
}

impl PerformanceCheck {
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

        let page_size = response.body.len();
        let load_time = response.duration;
        info!(
            "[Performance] {} loaded in {}ms, {}KB",
            base,
            load_time.as_millis(),
            page_size / 1024
        );

        let mut issues = Vec::new();
        check_load_time(load_time, page_size, &mut issues);
        check_page_size(page_size, &mut issues);
        check_caching(response.header("cache-control"), &mut issues);
        issues.extend(analyze_markup(&response.body));

        self.check_compression(&base, &mut issues).await;

        CheckResult::completed(issues)
    }

    /// Re-fetch while advertising gzip and brotli; the surviving
    /// content-encoding header shows what the server actually negotiated
    async fn check_compression(&self, base: &str, issues: &mut Vec<RawIssue>) {
        let Ok(response) = self.http_client.get_encoded(base).await else {
            return;
        };
        let encoding = response.header("content-encoding").unwrap_or("");

        if encoding.is_empty() {
            issues.push(
                RawIssue::new(
                    "missing-compression",
                    Severity::Medium,
                    "Server does not compress responses",
                )
                .with_fix(
                    "Enable response compression",
                    "Text assets typically shrink 70-90% under gzip or brotli. Enable compression at the web server or CDN.",
                    Some("gzip on;\nbrotli on;"),
                ),
            );
        } else if !encoding.contains("br") {
            issues.push(RawIssue::new(
                "missing-brotli-compression",
                Severity::Low,
                &format!(
                    "Server compresses with {} but does not offer brotli",
                    encoding
                ),
            ));
        }
    }
}

fn check_load_time(load_time: Duration, page_size: usize, issues: &mut Vec<RawIssue>) {
    let seconds = load_time.as_millis() as f64 / 1000.0;
    let size_note = if page_size > PAGE_SIZE_WARNING {
        " (affected by large page size)"
    } else {
        ""
    };

    if load_time > LOAD_TIME_CRITICAL {
        issues.push(
            RawIssue::new(
                "critical-page-load",
                Severity::Critical,
                &format!("Critical load time: {:.1}s{}", seconds, size_note),
            )
            .with_fix(
                "Reduce initial load time",
                "Load times over 3 seconds lose over half of mobile visitors. Defer non-critical scripts, compress assets and serve from a CDN.",
                None,
            ),
        );
    } else if load_time > LOAD_TIME_SLOW {
        issues.push(RawIssue::new(
            "slow-page-load",
            Severity::Medium,
            &format!("Slow load time: {:.1}s (target: under 2s)", seconds),
        ));
    } else if load_time > LOAD_TIME_MODERATE {
        issues.push(RawIssue::new(
            "moderate-page-load",
            Severity::Low,
            &format!("Moderate load time: {:.1}s", seconds),
        ));
    }
}

fn check_page_size(page_size: usize, issues: &mut Vec<RawIssue>) {
    let size_kb = page_size / 1024;
    if page_size > PAGE_SIZE_CRITICAL {
        issues.push(
            RawIssue::new(
                "critical-page-size",
                Severity::Critical,
                &format!("Page HTML is {}KB, over the 3MB budget", size_kb),
            )
            .with_fix(
                "Cut page weight",
                "Pages this heavy are unusable on mobile connections. Remove inlined assets and split the page.",
                None,
            ),
        );
    } else if page_size > PAGE_SIZE_WARNING {
        issues.push(RawIssue::new(
            "large-page-size",
            Severity::Medium,
            &format!("Page HTML is {}KB (target: under 1.5MB)", size_kb),
        ));
    }
}

fn check_caching(cache_control: Option<&str>, issues: &mut Vec<RawIssue>) {
    let header = cache_control.unwrap_or("");
    if header.is_empty() || header.contains("no-store") {
        issues.push(RawIssue::new(
            "missing-modern-caching",
            Severity::Low,
            "Response carries no usable Cache-Control policy",
        ));
    }
}

fn analyze_markup(html: &str) -> Vec<RawIssue> {
    let document = Html::parse_document(html);
    let mut issues = Vec::new();

    check_render_blocking(&document, &mut issues);
    check_lazy_loading(&document, &mut issues);

    issues
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|_| unreachable!())
}

fn check_render_blocking(document: &Html, issues: &mut Vec<RawIssue>) {
    let blocking = document
        .select(&selector("head script[src]"))
        .filter(|s| {
            let element = s.value();
            element.attr("defer").is_none()
                && element.attr("async").is_none()
                && element.attr("type") != Some("module")
        })
        .count();

    if blocking > 0 {
        issues.push(
            RawIssue::new(
                "render-blocking-javascript",
                Severity::Medium,
                &format!(
                    "{} script(s) in <head> block rendering",
                    blocking
                ),
            )
            .with_fix(
                "Defer non-critical scripts",
                "Scripts without defer or async halt HTML parsing until they download and execute.",
                Some(r#"<script defer src="/js/main.js"></script>"#),
            ),
        );
    }
}

fn check_lazy_loading(document: &Html, issues: &mut Vec<RawIssue>) {
    let images: Vec<_> = document.select(&selector("img")).collect();
    if images.len() < LAZY_LOADING_MIN_IMAGES {
        return;
    }
    let lazy = images
        .iter()
        .filter(|img| img.value().attr("loading") == Some("lazy"))
        .count();

    if lazy * 2 < images.len() {
        issues.push(RawIssue::new(
            "insufficient-lazy-loading",
            Severity::Low,
            &format!(
                "Only {} of {} images use loading=\"lazy\"",
                lazy,
                images.len()
            ),
        ));
    }
}

impl CheckUnit for PerformanceCheck {
    fn name(&self) -> &'static str {
        "performance"
    }

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>> {
        Box::pin(async move { Ok(self.run(url).await) })
    }
}
