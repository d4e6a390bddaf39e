//! qcloud-cns - client library for the Tencent Cloud (qcloud) CNS record API
//!
//! Architecture:
//! - Signed GET requests: HMAC-SHA256 over a sorted canonical string,
//!   base64-encoded, per the v2 signing scheme
//! - On-disk per-domain record cache (`record.list`) to avoid redundant
//!   RecordList calls and to support before/after comparison on mutation
//! - Cache-aware operations: idempotent create, no-op detection on modify,
//!   safe mode for multi-match delete
//! - Blocking I/O throughout; uses reqwest for HTTP (rustls)
//!
//! The caller supplies credentials and a writable directory via [`Config`];
//! everything else flows through [`CnsClient`].

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod record;
pub mod service;
pub mod signer;
pub mod transport;
pub mod validation;

pub use cache::RecordCache;
pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use record::{CreateOptions, DnsRecord, ListOptions, ModifyFields, RecordFilter, RecordType};
pub use service::{CnsClient, DeleteOutcome, ModifyOutcome, RecordSelector};
pub use signer::Signer;
pub use transport::{HttpTransport, Transport};
