// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - SSL/TLS Check
 * Tests HTTPS availability and HTTP-to-HTTPS redirect configuration
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::errors::ScannerResult;
use crate::http_client::HttpClient;
use crate::orchestrator::CheckUnit;
use crate::types::{CheckResult, RawIssue, Severity};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, info};

pub struct SslCheck {
    http_client: Arc<HttpClient>,
}

impl SslCheck {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    async fn run(&self, url: &str) -> CheckResult {
        let Some(host) = super::host_of(url) else {
            return CheckResult::failed(format!("Cannot resolve hostname from {}", url));
        };

        let mut issues = Vec::new();
        info!("[SSL] Testing HTTPS support for {}", host);

        // Any HTTP status means the TLS handshake and connection worked;
        // only a transport failure counts as "no HTTPS"
        let supports_https = match self.http_client.get(&format!("https://{}", host)).await {
            Ok(_) => true,
            Err(e) => {
                debug!("[SSL] HTTPS request failed for {}: {}", host, e);
                issues.push(
                    RawIssue::new(
                        "no-https",
                        Severity::Critical,
                        "Your website does not support HTTPS",
                    )
                    .with_fix(
                        "Enable HTTPS",
                        "Set up SSL/TLS certificates for your website. Consider using Let's Encrypt for free certificates.",
                        None,
                    ),
                );
                false
            }
        };

        if supports_https {
            self.check_http_redirect(&host, &mut issues).await;
        }

        CheckResult::completed(issues)
    }

    /// Plain-HTTP requests should land on HTTPS via a permanent redirect
    async fn check_http_redirect(&self, host: &str, issues: &mut Vec<RawIssue>) {
        match self
            .http_client
            .get_no_redirect(&format!("http://{}", host))
            .await
        {
            Ok(response) => {
                let redirects_to_https = response.is_redirect()
                    && response
                        .header("location")
                        .map(|l| l.contains("https"))
                        .unwrap_or(false);

                if !redirects_to_https {
                    issues.push(
                        RawIssue::new(
                            "no-http-redirect",
                            Severity::Medium,
                            "HTTP to HTTPS redirection is not properly configured",
                        )
                        .with_fix(
                            "Set Up HTTP to HTTPS Redirection",
                            "Configure your web server to automatically redirect all HTTP traffic to HTTPS.",
                            None,
                        ),
                    );
                }
            }
            Err(e) => {
                // server not answering on port 80 at all is acceptable
                debug!("[SSL] HTTP probe failed for {}: {}", host, e);
            }
        }
    }
}

impl CheckUnit for SslCheck {
    fn name(&self) -> &'static str {
        "ssl"
    }

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>> {
        Box::pin(async move { Ok(self.run(url).await) })
    }
}
