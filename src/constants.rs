//! Common constants used throughout the qcloud-cns crate

//==============================================================================
// Qcloud API Constants
//==============================================================================

/// Host suffix for v2 API endpoints; the full base URL is
/// `{module}.api.qcloud.com/v2/index.php?`
pub const API_HOST_SUFFIX: &str = ".api.qcloud.com/v2/index.php?";

/// Default API module for record operations
pub const DEFAULT_MODULE: &str = "cns";

/// Signature method sent with every request
pub const SIGNATURE_METHOD: &str = "HmacSHA256";

/// HTTP method used for all API calls
pub const HTTP_METHOD: &str = "GET";

/// User agent string for API requests
pub const USER_AGENT: &str = "qcloud-cns/0.1";

/// Inclusive lower bound of the request nonce
pub const NONCE_MIN: u32 = 10_000;

/// Inclusive upper bound of the request nonce
pub const NONCE_MAX: u32 = 99_999;

//==============================================================================
// Record Constants
//==============================================================================

/// Default TTL applied when a create call does not specify one
pub const DEFAULT_TTL: u32 = 600;

//==============================================================================
// Timeout Constants
//==============================================================================

/// HTTP request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

//==============================================================================
// File Names
//==============================================================================

/// Configuration file name inside the data directory
pub const CONF_FILE: &str = "cns.conf";

/// Record cache file name inside the data directory
pub const CACHE_FILE: &str = "record.list";

//==============================================================================
// Config Templates
//==============================================================================

/// Commented credential template written when the config file is first created
pub const CONF_TEMPLATE: &str = "\
# App: qcloud-cns
# Description: the qcloud API needs a secretId and a secretKey
# How to get them: https://console.cloud.tencent.com/cam/capi
# Example:
# secretId: idAafkSyAJohQSnRidZShsDLsDuMqYUgWecQ
# secretKey: zAuhBlapaarSHJMrKfYtheLyMgLUvqrL
";

/// Commented domains example appended when no domains are configured
pub const DOMAINS_TEMPLATE: &str = "\
# domains
# Example:
# domains:
#   - example.com
#   - example.cn
";

//==============================================================================
// Environment Variable Names
//==============================================================================

/// Environment variable name for the qcloud secret id
pub const ENV_SECRET_ID: &str = "QCLOUD_SECRET_ID";

/// Environment variable name for the qcloud secret key
pub const ENV_SECRET_KEY: &str = "QCLOUD_SECRET_KEY";
