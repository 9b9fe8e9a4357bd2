//! Error types for Threadkeep operations.
//!
//! Most failures during an archive run are recoverable and only logged: a page
//! that cannot be fetched becomes an empty document and an asset that cannot
//! be downloaded keeps its remote reference. The variants here surface where a
//! caller actually has to decide something, and for filesystem errors, which
//! end the run.
//!
//! # Example
//!
//! ```rust
//! use threadkeep_core::{Result, ThreadkeepError};
//!
//! fn require_http(url: &str) -> Result<()> {
//!     if !url.starts_with("http") {
//!         return Err(ThreadkeepError::InvalidUrl(url.to_string()));
//!     }
//!     Ok(())
//! }
//! # assert!(require_http("ftp://example.com").is_err());
//! ```

use thiserror::Error;

/// Main error type for archiving operations.
#[derive(Error, Debug)]
pub enum ThreadkeepError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps DNS failures, refused connections, TLS problems and body read
    /// errors.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Non-success status after the retry policy gave up.
    #[error("{url} responded with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed, has no http(s) scheme or has no
    /// path basename to save it under.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing or rewriting errors, including invalid CSS selectors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Filesystem errors while creating the output tree or writing files.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Site profile or archive configuration errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for ThreadkeepError.
pub type Result<T> = std::result::Result<T, ThreadkeepError>;
