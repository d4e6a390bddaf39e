//! On-disk record cache
//!
//! One YAML file (`record.list`) per data directory, logically a mapping of
//! domain name to its last-known full record set. The file is opened in
//! append+read mode on load so a first run creates an empty file without
//! erroring; every write replaces the file with a single authoritative
//! snapshot of the in-memory state.
//!
//! Single-writer: concurrent processes sharing the same directory are not
//! supported and can clobber each other's snapshots. No fsync is forced;
//! durability follows the underlying storage.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Read as _;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::CACHE_FILE;
use crate::error::Result;
use crate::record::DnsRecord;

/// Domain-keyed store of last-known record sets
#[derive(Debug)]
pub struct RecordCache {
    path: PathBuf,
    entries: HashMap<String, Vec<DnsRecord>>,
}

impl RecordCache {
    /// Opens (and on first use creates) the cache file under `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CACHE_FILE);
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        let entries = if content.trim().is_empty() {
            HashMap::new()
        } else {
            match serde_yaml::from_str(&content) {
                Ok(entries) => entries,
                Err(err) => {
                    // A half-written or legacy append-log file is not worth
                    // failing over; the next refresh rebuilds it.
                    warn!(path = %path.display(), %err, "unreadable record cache, starting empty");
                    HashMap::new()
                }
            }
        };

        debug!(path = %path.display(), domains = entries.len(), "record cache loaded");
        Ok(Self { path, entries })
    }

    /// Last-known record set for a domain, if any
    pub fn get(&self, domain: &str) -> Option<&[DnsRecord]> {
        self.entries.get(domain).map(Vec::as_slice)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.entries.contains_key(domain)
    }

    /// Replaces the entry for `domain` wholesale and persists
    pub fn refresh(&mut self, domain: &str, records: Vec<DnsRecord>) -> Result<()> {
        debug!(domain, count = records.len(), "cache refresh");
        self.entries.insert(domain.to_string(), records);
        self.persist()
    }

    /// Merges server-returned fields into the cached record with `id` and
    /// persists. Returns the patched record, or `None` when the domain or id
    /// is not cached (an external change raced us; the next refresh heals it).
    pub fn patch_one(&mut self, domain: &str, id: u64, patch: &Value) -> Result<Option<DnsRecord>> {
        let patched = match self.entries.get_mut(domain) {
            Some(records) => match records.iter_mut().find(|r| r.id == id) {
                Some(record) => {
                    record.apply_patch(patch)?;
                    Some(record.clone())
                }
                None => None,
            },
            None => None,
        };
        if patched.is_some() {
            self.persist()?;
        } else {
            warn!(domain, id, "patch target not in cache");
        }
        Ok(patched)
    }

    /// Removes the cached record with `id` and persists; returns whether a
    /// record was removed.
    pub fn remove_one(&mut self, domain: &str, id: u64) -> Result<bool> {
        let removed = match self.entries.get_mut(domain) {
            Some(records) => {
                let before = records.len();
                records.retain(|r| r.id != id);
                records.len() != before
            }
            None => false,
        };
        if removed {
            self.persist()?;
        } else {
            warn!(domain, id, "remove target not in cache");
        }
        Ok(removed)
    }

    /// Appends a record to the domain's set, dropping any existing record
    /// with the same id first, and persists.
    pub fn upsert(&mut self, domain: &str, record: DnsRecord) -> Result<()> {
        let records = self.entries.entry(domain.to_string()).or_default();
        records.retain(|r| r.id != record.id);
        records.push(record);
        self.persist()
    }

    /// Writes the full in-memory state as one snapshot (truncate-and-rewrite)
    fn persist(&self) -> Result<()> {
        let snapshot = serde_yaml::to_string(&self.entries)?;
        fs::write(&self.path, snapshot)?;
        Ok(())
    }
}

//==============================================================================
// Tests
//==============================================================================
