// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Scanner Configuration
 * Process-wide scan settings, injected at construction time
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Shared request timeout applied to every check unit fetch, in milliseconds.
/// A single constant for the whole process keeps repeated scans comparable.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 8000;

/// Scan-wide configuration. Read-only after startup; the only process-wide
/// shared state in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Timeout for each outbound HTTP request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Retries per check unit after its first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff between unit retries
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Maximum issues surfaced in the unauthenticated preview
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,

    /// Optional ceiling on a unit's total wall-clock time including retries.
    /// Disabled by default; a timed-out unit is recorded as errored.
    #[serde(default)]
    pub scan_deadline_ms: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Scoring policy for dimension aggregation. Stated here explicitly so it is
/// never inferred per scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_critical_penalty")]
    pub critical_penalty: u32,

    #[serde(default = "default_medium_penalty")]
    pub medium_penalty: u32,

    #[serde(default = "default_low_penalty")]
    pub low_penalty: u32,

    /// Per-dimension weights for the overall score. Dimensions absent from
    /// this table fall back to a plain mean when the table is empty, and are
    /// excluded from the overall score otherwise.
    #[serde(default = "default_weights")]
    pub weights: HashMap<String, f64>,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_preview_count() -> usize {
    3
}

fn default_user_agent() -> String {
    "SafeCheck Security Scanner".to_string()
}

fn default_critical_penalty() -> u32 {
    15
}

fn default_medium_penalty() -> u32 {
    8
}

fn default_low_penalty() -> u32 {
    3
}

fn default_weights() -> HashMap<String, f64> {
    HashMap::from([
        ("security".to_string(), 0.35),
        ("seo".to_string(), 0.25),
        ("performance".to_string(), 0.25),
        ("compliance".to_string(), 0.15),
    ])
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            preview_count: default_preview_count(),
            scan_deadline_ms: None,
            user_agent: default_user_agent(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            critical_penalty: default_critical_penalty(),
            medium_penalty: default_medium_penalty(),
            low_penalty: default_low_penalty(),
            weights: default_weights(),
        }
    }
}

impl ScannerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn scan_deadline(&self) -> Option<Duration> {
        self.scan_deadline_ms.map(Duration::from_millis)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ScannerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be greater than zero");
        }
        if self.preview_count == 0 {
            anyhow::bail!("preview_count must be greater than zero");
        }
        for (dimension, weight) in &self.scoring.weights {
            if !weight.is_finite() || *weight < 0.0 {
                anyhow::bail!("invalid weight {} for dimension '{}'", weight, dimension);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScannerConfig::default();
        assert_eq!(config.request_timeout_ms, 8000);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_base_delay_ms, 500);
        assert_eq!(config.preview_count, 3);
        assert!(config.scan_deadline_ms.is_none());
        assert_eq!(config.scoring.critical_penalty, 15);
        assert_eq!(config.scoring.medium_penalty, 8);
        assert_eq!(config.scoring.low_penalty, 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_toml_roundtrip_with_partial_file() {
        let parsed: ScannerConfig =
            toml::from_str("request_timeout_ms = 3000\n[scoring]\ncritical_penalty = 20\n")
                .unwrap();
        assert_eq!(parsed.request_timeout_ms, 3000);
        assert_eq!(parsed.scoring.critical_penalty, 20);
        // untouched fields keep their defaults
        assert_eq!(parsed.max_retries, 2);
        assert_eq!(parsed.scoring.medium_penalty, 8);
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = ScannerConfig {
            request_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
