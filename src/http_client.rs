// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - HTTP Client
 * Shared fetch discipline for all check units: bounded timeout, status codes
 * treated as data, transport failures as errors
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::config::ScannerConfig;
use crate::errors::{ScannerError, ScannerResult};
use anyhow::{Context, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Maximum response body size (5MB) to prevent memory exhaustion;
/// oversized bodies are truncated, not rejected
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

const MAX_REDIRECTS: usize = 5;

#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    /// Same client configuration but with redirects disabled, for checks
    /// that inspect redirect behavior itself
    no_redirect_client: Arc<Client>,
    timeout: Duration,
    max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    /// Header names lowercased for case-insensitive lookup
    pub headers: HashMap<String, String>,
    pub duration: Duration,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status_code, 301 | 302 | 307 | 308)
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.body.contains(pattern)
    }
}

impl HttpClient {
    pub fn new(config: &ScannerConfig) -> Result<Self> {
        let timeout = config.request_timeout();

        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.clone())
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        let no_redirect_client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .tcp_nodelay(true)
            .build()
            .context("Failed to create no-redirect HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            no_redirect_client: Arc::new(no_redirect_client),
            timeout,
            max_body_size: MAX_BODY_SIZE,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET a URL. Any HTTP status resolves `Ok`; only transport failures
    /// (DNS, connection refused, timeout) return `Err`.
    pub async fn get(&self, url: &str) -> ScannerResult<HttpResponse> {
        self.execute(&self.client, url).await
    }

    /// GET without following redirects, for redirect-policy checks
    pub async fn get_no_redirect(&self, url: &str) -> ScannerResult<HttpResponse> {
        self.execute(&self.no_redirect_client, url).await
    }

    /// GET while advertising compression support. reqwest is built without
    /// automatic decompression here, so the content-encoding header survives
    /// for inspection; callers read headers, not the body.
    pub async fn get_encoded(&self, url: &str) -> ScannerResult<HttpResponse> {
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .header("Accept-Encoding", "gzip, br")
            .send()
            .await
            .map_err(ScannerError::from)?;

        let status_code = response.status().as_u16();
        let headers = Self::collect_headers(&response);
        debug!(url = url, status = status_code, "encoded GET completed");

        Ok(HttpResponse {
            status_code,
            body: String::new(),
            headers,
            duration: started.elapsed(),
        })
    }

    /// HEAD request for existence probes where the body is irrelevant
    pub async fn head(&self, url: &str) -> ScannerResult<HttpResponse> {
        let started = Instant::now();
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(ScannerError::from)?;

        let status_code = response.status().as_u16();
        let headers = Self::collect_headers(&response);
        debug!(url = url, status = status_code, "HEAD request completed");

        Ok(HttpResponse {
            status_code,
            body: String::new(),
            headers,
            duration: started.elapsed(),
        })
    }

    async fn execute(&self, client: &Client, url: &str) -> ScannerResult<HttpResponse> {
        let started = Instant::now();
        let response = client.get(url).send().await.map_err(ScannerError::from)?;

        let status_code = response.status().as_u16();
        let headers = Self::collect_headers(&response);

        let body_bytes = response.bytes().await.unwrap_or_default();
        let body = if body_bytes.len() > self.max_body_size {
            String::from_utf8_lossy(&body_bytes[..self.max_body_size]).to_string()
        } else {
            String::from_utf8_lossy(&body_bytes).to_string()
        };

        let duration = started.elapsed();
        debug!(
            url = url,
            status = status_code,
            bytes = body.len(),
            elapsed_ms = duration.as_millis() as u64,
            "GET request completed"
        );

        Ok(HttpResponse {
            status_code,
            body,
            headers,
            duration,
        })
    }

    fn collect_headers(response: &reqwest::Response) -> HashMap<String, String> {
        let headers = response.headers();
        let mut map = HashMap::with_capacity(headers.len());
        for (k, v) in headers.iter() {
            if let Ok(value_str) = v.to_str() {
                map.insert(k.as_str().to_lowercase(), value_str.to_string());
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_header(name: &str, value: &str) -> HttpResponse {
        HttpResponse {
            status_code: 200,
            body: String::new(),
            headers: HashMap::from([(name.to_string(), value.to_string())]),
            duration: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = response_with_header("content-type", "text/html");
        assert_eq!(response.header("Content-Type"), Some("text/html"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_redirect_status_classification() {
        for code in [301, 302, 307, 308] {
            let mut response = response_with_header("location", "https://example.com/");
            response.status_code = code;
            assert!(response.is_redirect(), "status {} should be a redirect", code);
        }
        let response = response_with_header("content-type", "text/html");
        assert!(!response.is_redirect());
        assert!(response.is_success());
    }
}
