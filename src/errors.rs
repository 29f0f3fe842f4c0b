// Copyright (c) 2026 SafeCheck. All rights reserved.
// This software is proprietary and confidential.

/**
 * SafeCheck - Error Types
 * Error handling for the scan pipeline, built on thiserror
 *
 * @copyright 2026 SafeCheck
 * @license Proprietary
 */

use std::time::Duration;
use thiserror::Error;

/// Main scanner error type
#[derive(Error, Debug)]
pub enum ScannerError {
    /// Network-related errors (transport level)
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// HTTP-level errors (malformed responses, oversized bodies)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The target URL could not be parsed
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Operation exceeded its deadline
    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// General errors
    #[error("Scanner error: {0}")]
    General(String),
}

/// Network-specific errors with detailed classification
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection timeout after {timeout:?} to {url}")]
    ConnectionTimeout { url: String, timeout: Duration },

    #[error("DNS resolution failed for {host}: {reason}")]
    DnsResolutionFailed { host: String, reason: String },

    #[error("Connection refused for {url}")]
    ConnectionRefused { url: String },

    #[error("Connection reset by peer for {url}")]
    ConnectionReset { url: String },

    #[error("Too many redirects for {url}")]
    TooManyRedirects { url: String },

    #[error("Network error: {0}")]
    Other(String),
}

/// Convert reqwest errors to our error types
impl From<reqwest::Error> for ScannerError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();

        if err.is_timeout() {
            ScannerError::Network(NetworkError::ConnectionTimeout {
                url,
                timeout: Duration::from_secs(8),
            })
        } else if err.is_connect() {
            ScannerError::Network(NetworkError::ConnectionRefused { url })
        } else if err.is_redirect() {
            ScannerError::Network(NetworkError::TooManyRedirects { url })
        } else if err.is_body() || err.is_decode() {
            ScannerError::Http(err.to_string())
        } else {
            ScannerError::General(err.to_string())
        }
    }
}

/// Result type for scanner operations
pub type ScannerResult<T> = Result<T, ScannerError>;
