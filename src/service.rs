//! Record-level operations over the CNS API and the local cache
//!
//! [`CnsClient`] is the domain-level surface: list, lookup, create, modify
//! and delete, each a short-lived transaction combining signed API calls
//! with cache reads and writes. The client decides per call whether the
//! cache can be trusted (an `update` flag or a cache miss forces a refresh),
//! mutates through the transport, then patches the cache to reflect the
//! server's authoritative response.
//!
//! Expected business outcomes — nothing matched, several records matched —
//! are returned as [`ModifyOutcome`]/[`DeleteOutcome`] variants, not errors.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::RecordCache;
use crate::config::Config;
use crate::constants::{DEFAULT_MODULE, DEFAULT_TTL};
use crate::error::Result;
use crate::record::{CreateOptions, DnsRecord, ListOptions, ModifyFields, RecordFilter, RecordType};
use crate::transport::{HttpTransport, Transport};

//==============================================================================
// Outcome types
//==============================================================================

/// How a record to modify is identified
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSelector {
    /// By provider-assigned record id
    Id(u64),
    /// By subdomain label, e.g. `www`
    SubDomain(String),
}

impl RecordSelector {
    fn filter(&self) -> RecordFilter {
        match self {
            RecordSelector::Id(id) => RecordFilter::new().id(*id),
            RecordSelector::SubDomain(sub_domain) => {
                RecordFilter::new().sub_domain(sub_domain.clone())
            }
        }
    }
}

/// Result of a modify call
#[derive(Debug, Clone, PartialEq)]
pub enum ModifyOutcome {
    /// The record was changed on the server; the cached record after patching
    Modified(DnsRecord),
    /// Merged fields equal the current ones; no network call was made
    Unchanged(DnsRecord),
    /// No record matched the selector
    NotFound,
    /// More than one record matched; nothing was mutated
    Ambiguous(Vec<DnsRecord>),
}

/// Result of a delete call
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Ids of the records deleted, in deletion order
    Deleted(Vec<u64>),
    /// No record matched the filter
    NotFound,
    /// Safe mode refused to act on multiple matches; nothing was mutated
    RefusedMultiple(Vec<DnsRecord>),
}

//==============================================================================
// Client
//==============================================================================

/// CNS record client: signed transport plus the on-disk record cache
///
/// One instance per cache directory; the design assumes a single writer
/// (see the cache module). Generic over [`Transport`] so tests can inject a
/// scripted transport.
pub struct CnsClient<T: Transport = HttpTransport> {
    transport: T,
    cache: RecordCache,
    domains: Vec<String>,
}

impl CnsClient<HttpTransport> {
    /// Builds an HTTP-backed client
    ///
    /// `dir` is the data directory holding `record.list`; `domains`
    /// overrides the configured domain list when non-empty.
    pub fn new(config: &Config, dir: impl AsRef<Path>, domains: &[String]) -> Result<Self> {
        let domains = config.require_domains(domains)?;
        let transport = HttpTransport::new(&config.credentials)?;
        let cache = RecordCache::open(dir)?;
        Ok(Self {
            transport,
            cache,
            domains,
        })
    }
}

impl<T: Transport> CnsClient<T> {
    /// Assembles a client from parts; used by tests and embedders that bring
    /// their own transport.
    pub fn with_transport(transport: T, cache: RecordCache, domains: Vec<String>) -> Self {
        Self {
            transport,
            cache,
            domains,
        }
    }

    /// Domains this client operates on by default
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Lists records per domain
    ///
    /// For each requested domain (all configured domains when `domains` is
    /// empty), a RecordList fetch runs when `update` is set or the domain is
    /// not cached; otherwise the cached set is returned as-is.
    pub fn list(
        &mut self,
        domains: &[String],
        update: bool,
        opts: &ListOptions,
    ) -> Result<HashMap<String, Vec<DnsRecord>>> {
        let domains = if domains.is_empty() {
            self.domains.clone()
        } else {
            domains.to_vec()
        };

        let mut ret = HashMap::new();
        for domain in &domains {
            if update || !self.cache.contains(domain) {
                self.fetch_records(domain, opts)?;
            }
            let records = self.cache.get(domain).unwrap_or_default().to_vec();
            ret.insert(domain.clone(), records);
        }
        Ok(ret)
    }

    /// Returns the cached records of `domain` matching every supplied filter
    /// field, refreshing first on `update` or cache miss.
    pub fn lookup(
        &mut self,
        domain: &str,
        filter: &RecordFilter,
        update: bool,
    ) -> Result<Vec<DnsRecord>> {
        if update || !self.cache.contains(domain) {
            self.fetch_records(domain, &ListOptions::default())?;
        }
        Ok(self
            .cache
            .get(domain)
            .unwrap_or_default()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    /// First record for which every filter field matches, if any
    pub fn lookup_one(
        &mut self,
        domain: &str,
        filter: &RecordFilter,
        update: bool,
    ) -> Result<Option<DnsRecord>> {
        if update || !self.cache.contains(domain) {
            self.fetch_records(domain, &ListOptions::default())?;
        }
        Ok(self
            .cache
            .get(domain)
            .unwrap_or_default()
            .iter()
            .find(|r| filter.matches(r))
            .cloned())
    }

    /// Creates a record, idempotently
    ///
    /// A cached record matching all five identifying fields is returned
    /// unchanged with no network call. Otherwise RecordCreate runs, the
    /// server-assigned fields are merged into the constructed record, and
    /// the cache entry is appended (displacing any stale record with the
    /// same id).
    pub fn create(
        &mut self,
        domain: &str,
        sub_domain: &str,
        value: &str,
        record_type: RecordType,
        record_line: &str,
        opts: &CreateOptions,
    ) -> Result<DnsRecord> {
        let filter = RecordFilter::new()
            .sub_domain(sub_domain)
            .value(value)
            .record_type(record_type)
            .record_line(record_line);
        if let Some(existing) = self.lookup_one(domain, &filter, false)? {
            debug!(domain, sub_domain, "record already exists, create is a no-op");
            return Ok(existing);
        }

        let mut params = base_params(domain);
        params.insert("subDomain".to_string(), sub_domain.to_string());
        params.insert("value".to_string(), value.to_string());
        params.insert("recordType".to_string(), record_type.to_string());
        params.insert("recordLine".to_string(), record_line.to_string());
        fill_record_options(&mut params, opts.ttl, opts.mx);

        let data = self.transport.call("RecordCreate", DEFAULT_MODULE, params)?;

        let mut record = DnsRecord {
            id: 0,
            sub_domain: sub_domain.to_string(),
            record_type,
            value: value.to_string(),
            record_line: record_line.to_string(),
            ttl: opts.ttl.unwrap_or(DEFAULT_TTL),
            mx: opts.mx,
            status: None,
            updated_on: None,
            extra: BTreeMap::new(),
        };
        record.apply_patch(data.get("record").unwrap_or(&Value::Null))?;

        info!(domain, sub_domain, id = record.id, "record created");
        self.cache.upsert(domain, record.clone())?;
        Ok(record)
    }

    /// Modifies the single record identified by `selector`
    ///
    /// Unsupplied fields keep their current values. When the merged
    /// (value, type, line) tuple equals the current one the network call is
    /// skipped entirely; `ttl`/`mx` ride along only when a call is made,
    /// matching the remote API's modify semantics.
    pub fn modify(
        &mut self,
        domain: &str,
        selector: &RecordSelector,
        fields: &ModifyFields,
        update: bool,
    ) -> Result<ModifyOutcome> {
        let mut matches = self.lookup(domain, &selector.filter(), update)?;
        if matches.is_empty() {
            return Ok(ModifyOutcome::NotFound);
        }
        if matches.len() > 1 {
            warn!(domain, count = matches.len(), "modify matched more than one record");
            return Ok(ModifyOutcome::Ambiguous(matches));
        }
        let current = matches.remove(0);

        let value = fields.value.clone().unwrap_or_else(|| current.value.clone());
        let record_type = fields.record_type.unwrap_or(current.record_type);
        let record_line = fields
            .record_line
            .clone()
            .unwrap_or_else(|| current.record_line.clone());

        if value == current.value
            && record_type == current.record_type
            && record_line == current.record_line
        {
            debug!(domain, id = current.id, "modify is a no-op, skipping network call");
            return Ok(ModifyOutcome::Unchanged(current));
        }

        let mut params = base_params(domain);
        params.insert("recordId".to_string(), current.id.to_string());
        params.insert("subDomain".to_string(), current.sub_domain.clone());
        params.insert("value".to_string(), value);
        params.insert("recordType".to_string(), record_type.to_string());
        params.insert("recordLine".to_string(), record_line);
        fill_record_options(&mut params, fields.ttl, fields.mx);

        let data = self.transport.call("RecordModify", DEFAULT_MODULE, params)?;
        let patch = data.get("record").cloned().unwrap_or(Value::Null);

        let updated = match self.cache.patch_one(domain, current.id, &patch)? {
            Some(record) => record,
            None => {
                // Raced an external cache change; patch the copy we resolved
                let mut record = current;
                record.apply_patch(&patch)?;
                record
            }
        };
        info!(domain, id = updated.id, "record modified");
        Ok(ModifyOutcome::Modified(updated))
    }

    /// Deletes every record matching `filter`
    ///
    /// With `safe` set (the default posture for callers), more than one
    /// match refuses to delete anything and reports the matches instead.
    /// Each deletion is one RecordDelete call followed by a cache removal,
    /// so a mid-loop failure leaves already-deleted records out of the cache.
    pub fn delete(
        &mut self,
        domain: &str,
        filter: &RecordFilter,
        safe: bool,
    ) -> Result<DeleteOutcome> {
        let matches = self.lookup(domain, filter, false)?;
        if matches.is_empty() {
            return Ok(DeleteOutcome::NotFound);
        }
        if matches.len() > 1 && safe {
            warn!(
                domain,
                ids = ?matches.iter().map(|r| r.id).collect::<Vec<_>>(),
                "safe mode refuses multi-record delete"
            );
            return Ok(DeleteOutcome::RefusedMultiple(matches));
        }

        let mut deleted = Vec::with_capacity(matches.len());
        for record in matches {
            let mut params = base_params(domain);
            params.insert("recordId".to_string(), record.id.to_string());
            self.transport.call("RecordDelete", DEFAULT_MODULE, params)?;
            self.cache.remove_one(domain, record.id)?;
            deleted.push(record.id);
        }
        info!(domain, ?deleted, "records deleted");
        Ok(DeleteOutcome::Deleted(deleted))
    }

    /// Id of the first record with `sub_domain`, if any
    pub fn record_id(&mut self, domain: &str, sub_domain: &str) -> Result<Option<u64>> {
        let filter = RecordFilter::new().sub_domain(sub_domain);
        Ok(self.lookup_one(domain, &filter, false)?.map(|r| r.id))
    }

    /// Value of the first record with `sub_domain`, if any
    pub fn record_value(&mut self, domain: &str, sub_domain: &str) -> Result<Option<String>> {
        let filter = RecordFilter::new().sub_domain(sub_domain);
        Ok(self.lookup_one(domain, &filter, false)?.map(|r| r.value))
    }

    /// Last-update timestamp of the first record with `sub_domain`, if any
    pub fn record_updated_on(&mut self, domain: &str, sub_domain: &str) -> Result<Option<String>> {
        let filter = RecordFilter::new().sub_domain(sub_domain);
        Ok(self
            .lookup_one(domain, &filter, false)?
            .and_then(|r| r.updated_on))
    }

    /// Fetches the full record set for `domain` and replaces the cache entry
    fn fetch_records(&mut self, domain: &str, opts: &ListOptions) -> Result<()> {
        let mut params = base_params(domain);
        opts.fill_params(&mut params);
        let data = self.transport.call("RecordList", DEFAULT_MODULE, params)?;
        let payload: RecordListData = serde_json::from_value(data)?;
        self.cache.refresh(domain, payload.records)
    }
}

fn base_params(domain: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("domain".to_string(), domain.to_string());
    params
}

fn fill_record_options(params: &mut BTreeMap<String, String>, ttl: Option<u32>, mx: Option<u32>) {
    if let Some(ttl) = ttl {
        params.insert("ttl".to_string(), ttl.to_string());
    }
    if let Some(mx) = mx {
        params.insert("mx".to_string(), mx.to_string());
    }
}

/// `data` payload of a RecordList response; counts and domain metadata are
/// not tracked, only the record set.
#[derive(Debug, Deserialize)]
struct RecordListData {
    #[serde(default)]
    records: Vec<DnsRecord>,
}

//==============================================================================
// Tests
//==============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_builds_matching_filter() {
        assert_eq!(
            RecordSelector::Id(42).filter(),
            RecordFilter::new().id(42)
        );
        assert_eq!(
            RecordSelector::SubDomain("www".to_string()).filter(),
            RecordFilter::new().sub_domain("www")
        );
    }

    #[test]
    fn record_list_data_tolerates_missing_records_key() {
        let payload: RecordListData =
            serde_json::from_value(serde_json::json!({"domain": {"name": "example.com"}}))
                .expect("parse");
        assert!(payload.records.is_empty());
    }
}
