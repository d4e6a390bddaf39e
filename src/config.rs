//! Configuration for qcloud-cns
//!
//! The caller supplies a writable directory; this module owns the `cns.conf`
//! YAML file inside it. A first run writes a commented credential template
//! and fails with a fatal, user-actionable error. When domains are required
//! but absent, a commented example block is appended to the same file so the
//! user can see exactly what to fill in.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;
use zeroize::Zeroizing;

use crate::constants::{CONF_FILE, CONF_TEMPLATE, DOMAINS_TEMPLATE, ENV_SECRET_ID, ENV_SECRET_KEY};
use crate::error::{Error, Result};
use crate::validation::validate_domain;

//==============================================================================
// Credentials
//==============================================================================

/// Symmetric-key API credentials, loaded once and used for every call
///
/// The secret key is wrapped in `Zeroizing` so it is cleared from memory on
/// drop.
#[derive(Clone)]
pub struct Credentials {
    pub secret_id: String,
    pub secret_key: Zeroizing<String>,
}

impl Credentials {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: Zeroizing::new(secret_key.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

//==============================================================================
// Config
//==============================================================================

/// Loaded configuration: credentials plus the optional tracked-domain list
///
/// # Loading priority
///
/// 1. Environment variables (`QCLOUD_SECRET_ID`, `QCLOUD_SECRET_KEY`)
/// 2. The `cns.conf` file in the supplied directory
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Domains from the config file; may be empty
    pub domains: Vec<String>,
    conf_path: PathBuf,
}

impl Config {
    /// Loads configuration from `dir/cns.conf`, creating the directory and a
    /// commented template file on first use.
    ///
    /// Missing or empty credentials are a fatal startup condition: the
    /// template has been initialised on disk and the user must edit it.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let conf_path = dir.join(CONF_FILE);

        if !conf_path.exists() {
            fs::write(&conf_path, CONF_TEMPLATE)?;
            info!(path = %conf_path.display(), "config template initialised");
            return Err(Error::ConfigMissing { path: conf_path });
        }

        let content = fs::read_to_string(&conf_path)?;
        let file: Option<ConfFile> = serde_yaml::from_str(&content)?;
        let file = file.unwrap_or_default();

        let mut secret_id = file.secret_id.unwrap_or_default();
        let mut secret_key = file.secret_key.unwrap_or_default();
        if let Ok(v) = env::var(ENV_SECRET_ID) {
            if !v.is_empty() {
                secret_id = v;
            }
        }
        if let Ok(v) = env::var(ENV_SECRET_KEY) {
            if !v.is_empty() {
                secret_key = v;
            }
        }
        if secret_id.is_empty() || secret_key.is_empty() {
            return Err(Error::ConfigMissing { path: conf_path });
        }

        let domains = file.domains.unwrap_or_default();
        for domain in &domains {
            validate_domain(domain)?;
        }

        Ok(Self {
            credentials: Credentials::new(secret_id, secret_key),
            domains,
            conf_path,
        })
    }

    /// Resolves the domain set to operate on: the caller's non-empty list,
    /// else the configured list.
    ///
    /// When both are empty, a commented `domains:` example block is appended
    /// to the config file (once) and `Error::DomainsNotSet` is returned —
    /// the caller must fill the block in before any record operation can run.
    pub fn require_domains(&self, supplied: &[String]) -> Result<Vec<String>> {
        if !supplied.is_empty() {
            for domain in supplied {
                validate_domain(domain)?;
            }
            return Ok(supplied.to_vec());
        }
        if !self.domains.is_empty() {
            return Ok(self.domains.clone());
        }

        let content = fs::read_to_string(&self.conf_path).unwrap_or_default();
        if !content.contains(DOMAINS_TEMPLATE) {
            let appended = format!("{content}\n\n{DOMAINS_TEMPLATE}");
            fs::write(&self.conf_path, appended)?;
            info!(path = %self.conf_path.display(), "domains example appended to config");
        }
        Err(Error::DomainsNotSet {
            path: self.conf_path.clone(),
        })
    }

    /// Path of the backing config file
    pub fn conf_path(&self) -> &Path {
        &self.conf_path
    }
}

/// On-disk YAML shape of `cns.conf`
#[derive(Debug, Default, Deserialize)]
struct ConfFile {
    #[serde(rename = "secretId")]
    secret_id: Option<String>,
    #[serde(rename = "secretKey")]
    secret_key: Option<String>,
    domains: Option<Vec<String>>,
}

//==============================================================================
// Tests
//==============================================================================
