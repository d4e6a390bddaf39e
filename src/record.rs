//! DNS record model and typed request options
//!
//! Field names follow the cns v2 wire format (`name`, `type`, `line`, ...).
//! Records carry a flattened `extra` map so provider-defined fields survive a
//! cache round-trip even when this crate does not know them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

//==============================================================================
// Record type
//==============================================================================

/// Supported DNS record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Cname,
    Mx,
    Txt,
    Ns,
    Aaaa,
    Srv,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Ns => "NS",
            RecordType::Aaaa => "AAAA",
            RecordType::Srv => "SRV",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(RecordType::A),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            "TXT" => Ok(RecordType::Txt),
            "NS" => Ok(RecordType::Ns),
            "AAAA" => Ok(RecordType::Aaaa),
            "SRV" => Ok(RecordType::Srv),
            other => Err(Error::UnknownRecordType(other.to_string())),
        }
    }
}

//==============================================================================
// DnsRecord
//==============================================================================

/// A DNS resource record as tracked per domain
///
/// Identity within a domain is `id`. Equality compares every field, which is
/// what the cache round-trip tests rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Record id assigned by the provider
    pub id: u64,
    /// Subdomain label, e.g. `www` (wire field `name`)
    #[serde(rename = "name")]
    pub sub_domain: String,
    /// Record type (wire field `type`)
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Record value: an IP for A/AAAA, a host for CNAME/MX/NS
    pub value: String,
    /// Routing/ISP line designation (wire field `line`)
    #[serde(rename = "line")]
    pub record_line: String,
    /// TTL in seconds
    pub ttl: u32,
    /// MX priority, present on MX records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<String>,
    /// Provider-defined fields this crate does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DnsRecord {
    /// Merges a partial server response (e.g. the `record` object returned by
    /// RecordCreate/RecordModify) into this record.
    ///
    /// Known keys overwrite typed fields; unknown keys land in `extra`. The
    /// merge is implemented as an object-level overlay followed by a
    /// re-deserialization, so server values always win where supplied.
    pub fn apply_patch(&mut self, patch: &Value) -> Result<()> {
        let Some(patch) = patch.as_object() else {
            return Ok(());
        };
        let mut merged = serde_json::to_value(&*self)?;
        if let Some(target) = merged.as_object_mut() {
            for (k, v) in patch {
                target.insert(k.clone(), v.clone());
            }
        }
        *self = serde_json::from_value(merged)?;
        Ok(())
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DNS {} {} -> {} (line: {}, ttl: {}, id: {})",
            self.record_type, self.sub_domain, self.value, self.record_line, self.ttl, self.id
        )
    }
}

//==============================================================================
// Filters and per-operation options
//==============================================================================

/// Exact-equality filter over cached records
///
/// Every supplied field must match for a record to pass; an empty filter
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub id: Option<u64>,
    pub sub_domain: Option<String>,
    pub record_type: Option<RecordType>,
    pub value: Option<String>,
    pub record_line: Option<String>,
    pub status: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn sub_domain(mut self, sub_domain: impl Into<String>) -> Self {
        self.sub_domain = Some(sub_domain.into());
        self
    }

    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn record_line(mut self, record_line: impl Into<String>) -> Self {
        self.record_line = Some(record_line.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// True when every supplied field equals the record's field
    pub fn matches(&self, record: &DnsRecord) -> bool {
        if let Some(id) = self.id {
            if record.id != id {
                return false;
            }
        }
        if let Some(ref sub_domain) = self.sub_domain {
            if record.sub_domain != *sub_domain {
                return false;
            }
        }
        if let Some(record_type) = self.record_type {
            if record.record_type != record_type {
                return false;
            }
        }
        if let Some(ref value) = self.value {
            if record.value != *value {
                return false;
            }
        }
        if let Some(ref record_line) = self.record_line {
            if record.record_line != *record_line {
                return false;
            }
        }
        if let Some(ref status) = self.status {
            if record.status.as_deref() != Some(status.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Optional parameters for RecordList, passed through to the API
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Pagination offset, provider default 0
    pub offset: Option<u64>,
    /// Page size, provider default 20, max 100
    pub length: Option<u64>,
    /// Server-side subdomain filter
    pub sub_domain: Option<String>,
    /// Server-side record type filter
    pub record_type: Option<RecordType>,
    /// Server-side project id filter
    pub q_project_id: Option<u64>,
}

impl ListOptions {
    pub(crate) fn fill_params(&self, params: &mut BTreeMap<String, String>) {
        if let Some(offset) = self.offset {
            params.insert("offset".to_string(), offset.to_string());
        }
        if let Some(length) = self.length {
            params.insert("length".to_string(), length.to_string());
        }
        if let Some(ref sub_domain) = self.sub_domain {
            params.insert("subDomain".to_string(), sub_domain.clone());
        }
        if let Some(record_type) = self.record_type {
            params.insert("recordType".to_string(), record_type.to_string());
        }
        if let Some(q_project_id) = self.q_project_id {
            params.insert("qProjectId".to_string(), q_project_id.to_string());
        }
    }
}

/// Optional parameters for RecordCreate
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// TTL in seconds, 1 - 604800, provider default 600
    pub ttl: Option<u32>,
    /// MX priority, 0 - 50, required when the record type is MX
    pub mx: Option<u32>,
}

/// Field changes for a modify call; unset fields keep their current values
#[derive(Debug, Clone, Default)]
pub struct ModifyFields {
    pub value: Option<String>,
    pub record_type: Option<RecordType>,
    pub record_line: Option<String>,
    pub ttl: Option<u32>,
    pub mx: Option<u32>,
}

//==============================================================================
// Tests
//==============================================================================
