//! Error types for reference data loading
//!
//! Two families:
//! - [`ConnectionError`]: the spreadsheet cannot be reached or is unusable;
//!   the form must not render
//! - [`SecretsError`]: credentials could not be read at startup

use std::path::PathBuf;

/// The spreadsheet or a mandatory worksheet is unreachable
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Transport failure talking to the remote service
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Remote service answered with an error status
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Service-account credentials were rejected or unusable
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Mandatory worksheet is absent
    #[error("worksheet '{0}' not found")]
    MissingWorksheet(String),

    /// Payload did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Source refused to serve (offline fixtures, tests)
    #[error("spreadsheet unavailable: {0}")]
    Unavailable(String),
}

impl ConnectionError {
    /// Create transport error for url
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Whether the failure is a missing mandatory worksheet
    #[inline]
    #[must_use]
    pub fn is_missing_worksheet(&self) -> bool {
        matches!(self, Self::MissingWorksheet(_))
    }
}

/// Credentials could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    /// IO error reading the secrets file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Secrets file is not valid TOML or misses keys
    #[error("invalid secrets file: {0}")]
    Format(#[from] toml::de::Error),

    /// Spreadsheet id is blank
    #[error("spreadsheet_id is empty")]
    EmptySpreadsheetId,
}

impl SecretsError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
