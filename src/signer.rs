//! Request signing for the qcloud v2 API
//!
//! The v2 scheme signs a canonical string built from the HTTP method, the
//! bare endpoint (host and path, including the trailing `?`), and the request
//! parameters sorted by key. The signature is the base64 of an HMAC-SHA256
//! over that string, keyed with the account's secret key.
//!
//! Parameter values enter the canonical string raw. URL encoding happens
//! later, when the final query string is assembled; encoding before signing
//! would produce a signature the server rejects.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs canonical request strings with a fixed secret key
#[derive(Clone)]
pub struct Signer {
    secret_key: zeroize::Zeroizing<String>,
}

impl Signer {
    pub fn new(secret_key: &str) -> Self {
        Self {
            secret_key: zeroize::Zeroizing::new(secret_key.to_string()),
        }
    }

    /// Produces the signature and the canonical string it was computed over
    ///
    /// The canonical string is `method + base_url + "k1=v1&k2=v2&...&kn=vn"`
    /// with keys in ascending lexicographic order (the `BTreeMap` iteration
    /// order) and no trailing separator. Deterministic: identical inputs
    /// yield identical signatures.
    pub fn sign(
        &self,
        method: &str,
        base_url: &str,
        params: &BTreeMap<String, String>,
    ) -> (String, String) {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let canonical = format!("{method}{base_url}{query}");

        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(canonical.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        (signature, canonical)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the key, not even in debug output
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

//==============================================================================
// Tests
//==============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "cns.api.qcloud.com/v2/index.php?";

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn canonical_string_sorts_keys_ascending() {
        let signer = Signer::new("secret");
        let (_, canonical) =
            signer.sign("GET", BASE_URL, &params(&[("z", "1"), ("a", "2"), ("m", "3")]));
        assert_eq!(canonical, "GETcns.api.qcloud.com/v2/index.php?a=2&m=3&z=1");
    }

    #[test]
    fn signature_matches_known_vector() {
        let signer = Signer::new("secret");
        let (sig, canonical) =
            signer.sign("GET", BASE_URL, &params(&[("z", "1"), ("a", "2"), ("m", "3")]));
        assert_eq!(canonical, "GETcns.api.qcloud.com/v2/index.php?a=2&m=3&z=1");
        // base64(hmac_sha256("secret", canonical))
        assert_eq!(sig, "Yhv22Na9qDc7o1zjG+mRoFO5P2EMDTAaBWJukckf7lY=");
    }

    #[test]
    fn signature_is_deterministic() {
        let signer = Signer::new("secret");
        let p = params(&[("Action", "RecordList"), ("domain", "example.com")]);
        let (first, _) = signer.sign("GET", BASE_URL, &p);
        let (second, _) = signer.sign("GET", BASE_URL, &p);
        assert_eq!(first, second);
    }

    #[test]
    fn single_character_change_alters_signature() {
        let signer = Signer::new("secret");
        let (a, _) = signer.sign("GET", BASE_URL, &params(&[("a", "1"), ("b", "2")]));
        let (b, _) = signer.sign("GET", BASE_URL, &params(&[("a", "1"), ("b", "3")]));
        assert_ne!(a, b);
        assert_eq!(a, "f7GSa4zo9VYPq7k9elobkgQDYkGbhV3OgbemUmNq95g=");
        assert_eq!(b, "4JvPG0kVo2VPYwD6hSqlPkjdAQQV0JRxO3Gbqka9+n8=");
    }

    #[test]
    fn different_keys_produce_different_signatures() {
        let p = params(&[("a", "1"), ("b", "2")]);
        let (a, _) = Signer::new("secret").sign("GET", BASE_URL, &p);
        let (b, _) = Signer::new("secreu").sign("GET", BASE_URL, &p);
        assert_ne!(a, b);
        assert_eq!(b, "3/kKdkVx8Q3ceZAqmONqQGRsHVeXkYyULsF6NsEmBEI=");
    }

    #[test]
    fn adjacent_boundary_values_do_not_collide() {
        // {"a":"1&b=2","b":"3"} and {"a":"1","b":"2&b=3"} concatenate to the
        // same byte stream under naive joining; the signatures must differ
        // only if the canonical strings do. The raw scheme makes them equal
        // strings, so this documents the one known ambiguity of the remote
        // API's design: both inputs canonicalize to "a=1&b=2&b=3".
        let signer = Signer::new("secret");
        let (_, c1) = signer.sign("GET", BASE_URL, &params(&[("a", "1&b=2"), ("b", "3")]));
        let (_, c2) = signer.sign("GET", BASE_URL, &params(&[("a", "1"), ("b", "2&b=3")]));
        assert_eq!(c1, "GETcns.api.qcloud.com/v2/index.php?a=1&b=2&b=3");
        assert_eq!(c2, c1);
    }
}
