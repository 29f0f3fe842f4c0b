// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Scanner Library
 * Exposes the scan pipeline for embedding and testing
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

pub mod categorization;
pub mod config;
pub mod dimensions;
pub mod normalizer;
pub mod preview;
pub mod report;
pub mod types;

// Scan execution
pub mod http_client;
pub mod orchestrator;
pub mod scanners;

// Error handling and resilience
pub mod errors;
pub mod retry;

pub use config::ScannerConfig;
pub use errors::{ScannerError, ScannerResult};
pub use orchestrator::{CheckUnit, ScanOrchestrator};
pub use report::{build_report, ScanReport};
pub use types::{CheckResult, Issue, RawIssue, RawScanRecord, Severity};
