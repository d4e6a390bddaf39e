//! Signed HTTP transport for the qcloud v2 API
//!
//! Every call is a single HTTPS GET against
//! `https://{module}.api.qcloud.com/v2/index.php?...` carrying the common
//! boilerplate fields plus the caller's action parameters, signed with the
//! account's secret key. Retries are deliberately disabled: RecordCreate,
//! RecordModify and RecordDelete are not idempotent on the wire, and a
//! silent retry could execute a mutation twice. Transient failures surface
//! to the caller instead.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use rand::Rng as _;
use serde_json::Value;
use tracing::debug;
use urlencoding::encode;

use crate::config::Credentials;
use crate::constants::{
    API_HOST_SUFFIX, HTTP_METHOD, NONCE_MAX, NONCE_MIN, REQUEST_TIMEOUT_SECS, SIGNATURE_METHOD,
    USER_AGENT,
};
use crate::error::{Error, Result};
use crate::signer::Signer;

//==============================================================================
// Trait
//==============================================================================

/// Seam between the record service and the network
///
/// `call` issues one signed API request and returns the `data` payload of a
/// successful response. The service layer is generic over this trait so
/// tests can substitute a scripted transport.
pub trait Transport {
    fn call(&self, action: &str, module: &str, params: BTreeMap<String, String>) -> Result<Value>;
}

//==============================================================================
// HTTP implementation
//==============================================================================

/// Blocking reqwest-backed transport
pub struct HttpTransport {
    secret_id: String,
    signer: Signer,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            secret_id: credentials.secret_id.clone(),
            signer: Signer::new(credentials.secret_key.as_str()),
            client,
        })
    }

    /// Common fields sent with every request
    fn boilerplate(&self, action: &str) -> BTreeMap<String, String> {
        let nonce = rand::thread_rng().gen_range(NONCE_MIN..=NONCE_MAX);
        let mut params = BTreeMap::new();
        params.insert("Action".to_string(), action.to_string());
        params.insert("Nonce".to_string(), nonce.to_string());
        params.insert("SecretId".to_string(), self.secret_id.clone());
        params.insert("SignatureMethod".to_string(), SIGNATURE_METHOD.to_string());
        params.insert("Timestamp".to_string(), Utc::now().timestamp().to_string());
        params
    }
}

impl Transport for HttpTransport {
    fn call(&self, action: &str, module: &str, params: BTreeMap<String, String>) -> Result<Value> {
        let base_url = format!("{module}{API_HOST_SUFFIX}");

        // Caller params win on key collision, matching the original merge
        let mut merged = self.boilerplate(action);
        merged.extend(params);

        // Sign over raw values, then URL-encode for the actual query string
        let (signature, _canonical) = self.signer.sign(HTTP_METHOD, &base_url, &merged);
        merged.insert("Signature".to_string(), signature);

        let url = format!("https://{base_url}{}", encoded_query(&merged));
        // The full URL embeds the signature; log only what identifies the call
        debug!(action, module, "GET {}{}", module, API_HOST_SUFFIX);

        let response = self.client.get(&url).send()?;
        let body: Value = response.json()?;
        check_envelope(body)
    }
}

/// URL-encodes keys and values and joins them into a query string
fn encoded_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Maps the JSON envelope to success data or a request failure
///
/// `code == 0` is the only success marker; an absent or non-numeric `code`
/// counts as failure. The full body travels with the error for diagnostics.
pub(crate) fn check_envelope(body: Value) -> Result<Value> {
    match body.get("code").and_then(Value::as_i64) {
        Some(0) => Ok(body.get("data").cloned().unwrap_or(Value::Null)),
        _ => Err(Error::Api { body }),
    }
}

//==============================================================================
// Tests
//==============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport() -> HttpTransport {
        let credentials = Credentials::new("test-id", "test-key");
        HttpTransport::new(&credentials).expect("client build")
    }

    #[test]
    fn boilerplate_carries_required_fields() {
        let params = transport().boilerplate("RecordList");
        assert_eq!(params.get("Action").map(String::as_str), Some("RecordList"));
        assert_eq!(params.get("SecretId").map(String::as_str), Some("test-id"));
        assert_eq!(
            params.get("SignatureMethod").map(String::as_str),
            Some("HmacSHA256")
        );
        let nonce: u32 = params.get("Nonce").expect("nonce").parse().expect("numeric");
        assert!((NONCE_MIN..=NONCE_MAX).contains(&nonce));
        let ts: i64 = params.get("Timestamp").expect("ts").parse().expect("numeric");
        assert!(ts > 1_500_000_000);
    }

    #[test]
    fn caller_params_override_boilerplate() {
        let mut merged = transport().boilerplate("RecordList");
        let mut caller = BTreeMap::new();
        caller.insert("Action".to_string(), "RecordCreate".to_string());
        caller.insert("domain".to_string(), "example.com".to_string());
        merged.extend(caller);
        assert_eq!(merged.get("Action").map(String::as_str), Some("RecordCreate"));
        assert_eq!(merged.get("domain").map(String::as_str), Some("example.com"));
    }

    #[test]
    fn encoded_query_escapes_values_only_at_this_stage() {
        let mut params = BTreeMap::new();
        params.insert("domain".to_string(), "example.com".to_string());
        params.insert("value".to_string(), "a b&c".to_string());
        assert_eq!(encoded_query(&params), "domain=example.com&value=a%20b%26c");
    }

    #[test]
    fn envelope_code_zero_returns_data() {
        let data = check_envelope(json!({"code": 0, "message": "", "data": {"records": []}}))
            .expect("success envelope");
        assert_eq!(data, json!({"records": []}));
    }

    #[test]
    fn envelope_missing_data_is_null() {
        let data = check_envelope(json!({"code": 0})).expect("success envelope");
        assert!(data.is_null());
    }

    #[test]
    fn envelope_nonzero_code_is_api_error() {
        let err = check_envelope(json!({"code": 4100, "message": "auth failed"}))
            .expect_err("error envelope");
        match err {
            Error::Api { body } => {
                assert_eq!(body["code"], 4100);
                assert_eq!(body["message"], "auth failed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn envelope_absent_code_is_api_error() {
        assert!(check_envelope(json!({"message": "gateway mangled"})).is_err());
        assert!(check_envelope(json!({"code": "0"})).is_err());
    }
}
