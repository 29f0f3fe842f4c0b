// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Scan Orchestrator
 * Fans out all registered check units concurrently, applies per-unit retry,
 * isolates failures, and assembles one unified scan record
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use crate::config::ScannerConfig;
use crate::errors::{ScannerError, ScannerResult};
use crate::normalizer;
use crate::preview::select_preview;
use crate::retry::{retry_with_backoff, RetryConfig};
use crate::types::{CheckResult, CheckStatus, RawScanRecord, ScannerReport, Summary};
use futures::future::{join_all, BoxFuture};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// One independent, network-bound heuristic check.
///
/// Contract: a unit fetches whatever it needs from the target URL, catches
/// its own transport failures (returning `Ok` with `CheckStatus::Error`),
/// shares no mutable state with other units, and is safe to run concurrently
/// against the same URL. An `Err` return is an escaped failure the
/// orchestrator will retry; well-behaved units never produce one.
pub trait CheckUnit: Send + Sync {
    /// Stable unit name, used as the key in the scan record's scanner map
    fn name(&self) -> &'static str;

    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ScannerResult<CheckResult>>;
}

/// Runs a registered set of check units against one target URL and produces
/// a [`RawScanRecord`]. Units run concurrently; the record's flat issue list
/// is assembled in registration order, never completion order, so repeated
/// scans of identical responses are byte-for-byte reproducible.
pub struct ScanOrchestrator {
    units: Vec<Arc<dyn CheckUnit>>,
    retry: RetryConfig,
    preview_count: usize,
    /// Optional ceiling on one unit's total time including its retry
    /// schedule; a unit still pending at cutoff is recorded as errored
    deadline: Option<Duration>,
}

impl ScanOrchestrator {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            units: Vec::new(),
            retry: RetryConfig::default()
                .with_max_attempts(config.max_retries + 1)
                .with_initial_backoff(config.retry_base_delay()),
            preview_count: config.preview_count,
            deadline: config.scan_deadline(),
        }
    }

    /// Register a check unit. Registration order determines the order of
    /// issues in the final record.
    pub fn register(&mut self, unit: Arc<dyn CheckUnit>) -> &mut Self {
        self.units.push(unit);
        self
    }

    pub fn unit_names(&self) -> Vec<&'static str> {
        self.units.iter().map(|u| u.name()).collect()
    }

    /// Run every registered unit against the URL and assemble the record.
    ///
    /// Best effort by construction: unit failures are isolated, malformed
    /// issues repaired, unparseable URLs passed through. This function does
    /// not return errors.
    pub async fn run_scan(&self, url: &str) -> RawScanRecord {
        let normalized_url = normalize_url(url);
        info!(
            url = normalized_url.as_str(),
            units = self.units.len(),
            "Starting scan"
        );

        let outcomes = join_all(
            self.units
                .iter()
                .map(|unit| self.run_unit(unit, &normalized_url)),
        )
        .await;

        let mut all_issues = Vec::new();
        let mut scanners = BTreeMap::new();

        for (unit, result) in self.units.iter().zip(outcomes) {
            let issues = normalizer::normalize(result.issues);
            info!(
                unit = unit.name(),
                status = ?result.status,
                issues = issues.len(),
                "Check unit finished"
            );
            all_issues.extend(issues.iter().cloned());
            scanners.insert(
                unit.name().to_string(),
                ScannerReport {
                    status: result.status,
                    error: result.error,
                    issues,
                    metadata: result.metadata,
                },
            );
        }

        let summary = Summary::of(&all_issues);
        let preview_issues = select_preview(&all_issues, self.preview_count);

        info!(
            url = normalized_url.as_str(),
            total = summary.total,
            critical = summary.critical,
            medium = summary.medium,
            low = summary.low,
            "Scan complete"
        );

        RawScanRecord {
            url: normalized_url,
            scan_id: generate_scan_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            issues: all_issues,
            summary,
            scanners,
            preview_issues,
        }
    }

    /// Run one unit through the retry wrapper and flatten every failure mode
    /// into a CheckResult. Retries apply only to errors escaping the unit;
    /// a unit that reports its own failure already handled it.
    async fn run_unit(&self, unit: &Arc<dyn CheckUnit>, url: &str) -> CheckResult {
        let attempts = retry_with_backoff(&self.retry, unit.name(), || unit.check(url));

        let outcome = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, attempts).await {
                Ok(result) => result,
                Err(_) => Err(ScannerError::Timeout { duration: deadline }),
            },
            None => attempts.await,
        };

        match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(unit = unit.name(), error = %err, "Check unit failed, isolating");
                CheckResult::failed(err.to_string())
            }
        }
    }
}

/// Normalize a target URL into `scheme://host[:port][path][?query]` form.
/// Scheme-less input gets `https://` prepended; the root path is dropped;
/// the fragment is always dropped. On parse failure the input is returned
/// unchanged so the scan can proceed and fail (or not) per unit.
pub fn normalize_url(input: &str) -> String {
    let formatted = if input.starts_with("http") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    match Url::parse(&formatted) {
        Ok(parsed) if parsed.host_str().is_some() => {
            let mut base = format!(
                "{}://{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or_default()
            );
            if let Some(port) = parsed.port() {
                base.push_str(&format!(":{}", port));
            }
            if !parsed.path().is_empty() && parsed.path() != "/" {
                base.push_str(parsed.path());
            }
            if let Some(query) = parsed.query() {
                base.push('?');
                base.push_str(query);
            }
            base
        }
        _ => {
            warn!(url = input, "URL normalization failed, passing through");
            input.to_string()
        }
    }
}

fn generate_scan_id() -> String {
    format!("scan_{}", Uuid::new_v4().simple())
}
