// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - SEO Check
 * Static HTML analysis of the landing page: title and meta description
 * quality, heading structure, canonical URL, image alt coverage, Open Graph
 * tags, plus robots.txt and sitemap.xml presence
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
use tracing::info;

const TITLE_MIN: usize = 10;
const TITLE_MAX: usize = 70;
const META_DESCRIPTION_MIN: usize = 50;
const META_DESCRIPTION_MAX: usize = 160;

pub struct SeoCheck {
    http_client: Arc<HttpClient>,
}

impl SeoCheck {
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

        // Html is not Send, so all parsing happens in this sync helper
        // before the next await point
        let mut issues = analyze_html(&response.body);

        if let Ok(robots) = self.http_client.get(&format!("{}/robots.txt", base)).await {
            if robots.status_code != 200 {
                issues.push(missing_robots_issue());
            }
        }
        if let Ok(sitemap) = self.http_client.get(&format!("{}/sitemap.xml", base)).await {
            if sitemap.status_code != 200 {
                issues.push(missing_sitemap_issue());
            }
        }

        info!("[SEO] Completed with {} findings for {}", issues.len(), base);
        CheckResult::completed(issues)
    }
}

fn analyze_html(html: &str) -> Vec<RawIssue> {
    let document = Html::parse_document(html);
    let mut issues = Vec::new();

    check_title(&document, &mut issues);
    check_meta_description(&document, &mut issues);
    check_headings(&document, &mut issues);
    check_canonical(&document, &mut issues);
    check_image_alts(&document, &mut issues);
    check_open_graph(&document, &mut issues);

    issues
}

fn selector(css: &str) -> Selector {
    // selectors are compile-time constants, parse cannot fail
    Selector::parse(css).unwrap_or_else(|_| unreachable!())
}

fn check_title(document: &Html, issues: &mut Vec<RawIssue>) {
    let title = document
        .select(&selector("head title"))
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string());

    match title {
        None => issues.push(
            RawIssue::new(
                "missing-title",
                Severity::Medium,
                "Page has no <title> element",
            )
            .with_fix(
                "Add a page title",
                "Search engines use the title as the primary result heading. Add a unique, descriptive <title> in the document head.",
                Some("<title>Your Page Title | Brand</title>"),
            ),
        ),
        Some(t) if t.is_empty() => issues.push(RawIssue::new(
            "missing-title",
            Severity::Medium,
            "Page <title> element is empty",
        )),
        Some(t) if t.chars().count() < TITLE_MIN => issues.push(
            RawIssue::new(
                "title-too-short",
                Severity::Low,
                &format!("Page title is only {} characters", t.chars().count()),
            )
            .with_value(t),
        ),
        Some(t) if t.chars().count() > TITLE_MAX => issues.push(
            RawIssue::new(
                "title-too-long",
                Severity::Low,
                &format!(
                    "Page title is {} characters and will be truncated in results",
                    t.chars().count()
                ),
            )
            .with_value(t),
        ),
        Some(_) => {}
    }
}

fn check_meta_description(document: &Html, issues: &mut Vec<RawIssue>) {
    let description = document
        .select(&selector(r#"head meta[name="description"]"#))
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string());

    match description {
        None => issues.push(
            RawIssue::new(
                "missing-meta-description",
                Severity::Medium,
                "Page has no meta description",
            )
            .with_fix(
                "Add a meta description",
                "The meta description is the snippet shown under the result title. Without one, search engines pick arbitrary page text.",
                Some(r#"<meta name="description" content="...">"#),
            ),
        ),
        Some(d) if d.is_empty() || d.chars().count() < META_DESCRIPTION_MIN => {
            issues.push(RawIssue::new(
                "meta-description-too-short",
                Severity::Low,
                &format!(
                    "Meta description is only {} characters",
                    d.chars().count()
                ),
            ))
        }
        Some(d) if d.chars().count() > META_DESCRIPTION_MAX => issues.push(RawIssue::new(
            "meta-description-too-long",
            Severity::Low,
            &format!(
                "Meta description is {} characters and will be truncated",
                d.chars().count()
            ),
        )),
        Some(_) => {}
    }
}

fn check_headings(document: &Html, issues: &mut Vec<RawIssue>) {
    let h1_count = document.select(&selector("h1")).count();
    if h1_count == 0 {
        issues.push(
            RawIssue::new(
                "missing-h1",
                Severity::Medium,
                "Page has no <h1> heading",
            )
            .with_fix(
                "Add a single H1 heading",
                "The H1 tells search engines what the page is about. Every page should have exactly one.",
                None,
            ),
        );
    } else if h1_count > 1 {
        issues.push(RawIssue::new(
            "multiple-h1",
            Severity::Low,
            &format!("Page has {} <h1> headings, expected one", h1_count),
        ));
    }
}

fn check_canonical(document: &Html, issues: &mut Vec<RawIssue>) {
    let canonical = document
        .select(&selector(r#"head link[rel="canonical"]"#))
        .next()
        .and_then(|l| l.value().attr("href"))
        .filter(|href| !href.trim().is_empty());

    if canonical.is_none() {
        issues.push(RawIssue::new(
            "missing-canonical",
            Severity::Low,
            "Page declares no canonical URL",
        ));
    }
}

fn check_image_alts(document: &Html, issues: &mut Vec<RawIssue>) {
    let images: Vec<_> = document.select(&selector("img")).collect();
    if images.is_empty() {
        return;
    }
    let missing = images
        .iter()
        .filter(|img| {
            img.value()
                .attr("alt")
                .map(|alt| alt.trim().is_empty())
                .unwrap_or(true)
        })
        .count();
    if missing > 0 {
        issues.push(RawIssue::new(
            "images-missing-alt",
            Severity::Low,
            &format!(
                "{} of {} images have no alt text",
                missing,
                images.len()
            ),
        ));
    }
}

fn check_open_graph(document: &Html, issues: &mut Vec<RawIssue>) {
    let has = |property: &str| {
        document
            .select(&selector(&format!(
                r#"head meta[property="og:{}"]"#,
                property
            )))
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    };

    let missing: Vec<&str> = ["title", "description", "image"]
        .iter()
        .filter(|p| !has(p))
        .copied()
        .collect();

    if !missing.is_empty() {
        issues.push(RawIssue::new(
            "incomplete-open-graph",
            Severity::Low,
            &format!(
                "Missing Open Graph tags: {}",
                missing
                    .iter()
                    .map(|p| format!("og:{}", p))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }
}

fn missing_robots_issue() -> RawIssue {
    RawIssue::new(
        "missing-robots-txt",
        Severity::Low,
        "No robots.txt found",
    )
    .with_fix(
        "Add a robots.txt",
        "robots.txt tells crawlers which parts of the site to index. Serve one at the site root, even if it allows everything.",
        Some("User-agent: *\nAllow: /"),
    )
}

fn missing_sitemap_issue() -> RawIssue {
    RawIssue::new(
        "missing-sitemap",
        Severity::Low,
        "No sitemap.xml found",
    )
}

impl CheckUnit for SeoCheck {
    fn name(&self) -> &'static str {
        "seo"
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
    fn test_well_formed_page_is_clean() {
        let html = r#"<html><head>
            <title>A perfectly reasonable page title</title>
            <meta name="description" content="A meta description that is comfortably long enough to satisfy the minimum length requirement.">
            <link rel="canonical" href="https://example.com/">
            <meta property="og:title" content="T">
            <meta property="og:description" content="D">
            <meta property="og:image" content="https://example.com/og.png">
        </head><body><h1>Heading</h1><img src="a.png" alt="a"></body></html>"#;
        assert!(analyze_html(html).is_empty());
    }

    #[test]
    fn test_missing_title_and_description() {
        let issues = analyze_html("<html><head></head><body><h1>x</h1></body></html>");
        let t = types(&issues);
        assert!(t.contains(&"missing-title"));
        assert!(t.contains(&"missing-meta-description"));
    }

    #[test]
    fn test_title_length_bounds() {
        let long_title = "x".repeat(90);
        let html = format!(
            "<html><head><title>{}</title></head><body><h1>x</h1></body></html>",
            long_title
        );
        assert!(types(&analyze_html(&html)).contains(&"title-too-long"));

        let html = "<html><head><title>short</title></head><body><h1>x</h1></body></html>";
        assert!(types(&analyze_html(html)).contains(&"title-too-short"));
    }

    #[test]
    fn test_multiple_h1() {
        let html = "<html><body><h1>a</h1><h1>b</h1></body></html>";
        assert!(types(&analyze_html(html)).contains(&"multiple-h1"));
    }

    #[test]
    fn test_images_missing_alt_counts() {
        let html = r#"<body><img src="a"><img src="b" alt=""><img src="c" alt="ok"></body>"#;
        let issues = analyze_html(html);
        let alt = issues
            .iter()
            .find(|i| i.issue_type.as_deref() == Some("images-missing-alt"))
            .unwrap();
        assert!(alt.description.as_deref().unwrap().starts_with("2 of 3"));
    }

    #[test]
    fn test_incomplete_open_graph_lists_missing_tags() {
        let html = r#"<head><meta property="og:title" content="T"></head>"#;
        let issues = analyze_html(html);
        let og = issues
            .iter()
            .find(|i| i.issue_type.as_deref() == Some("incomplete-open-graph"))
            .unwrap();
        let desc = og.description.as_deref().unwrap();
        assert!(desc.contains("og:description"));
        assert!(desc.contains("og:image"));
        assert!(!desc.contains("og:title,"));
    }
}
