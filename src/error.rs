//! Error types for qcloud-cns
//!
//! Hard failures (network, signing input, configuration, storage) surface as
//! [`Error`]. Expected business outcomes such as "no matching record" or
//! "more than one match" are not errors; they are returned as data from the
//! service layer so callers can inspect them.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the client
#[derive(Debug, Error)]
pub enum Error {
    /// The config file is missing or has no credentials; a commented template
    /// has been written to `path` and user action is required.
    #[error("credentials not configured; template initialised at {path}")]
    ConfigMissing { path: PathBuf },

    /// No domains configured and none supplied by the caller; a commented
    /// example block has been appended to the config file.
    #[error("domains not set, please check the config file at {path}")]
    DomainsNotSet { path: PathBuf },

    /// A domain name failed validation before being used in a request
    #[error("invalid domain name '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    /// The API answered with a non-zero (or absent) `code`; the full response
    /// body is kept for diagnostics.
    #[error("api request failed: {body}")]
    Api { body: serde_json::Value },

    /// A record type string outside the supported set
    #[error("unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

//==============================================================================
// Tests
//==============================================================================
