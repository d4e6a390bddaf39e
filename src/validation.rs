//! Validation utilities for qcloud-cns
//!
//! Domains are validated before they are placed in request parameters, so a
//! typo in the config file fails fast instead of producing an opaque API
//! error.

use crate::error::{Error, Result};

/// Validates that a string is a usable apex domain name
///
/// Enforces RFC 1035 length limits and common DNS syntax rules:
///
/// - maximum total length 253 characters (a trailing dot is tolerated)
/// - labels up to 63 characters, separated by single dots
/// - labels may contain letters, digits, `-` and `_`, but a hyphen may not
///   lead or trail a label
///
/// The CNS API takes apex domains only (e.g. `example.com`, not `www`), so
/// neither `@` nor wildcard labels are accepted here.
pub fn validate_domain(domain: &str) -> Result<()> {
    let fail = |reason: &str| {
        Err(Error::InvalidDomain {
            domain: domain.to_string(),
            reason: reason.to_string(),
        })
    };

    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return fail("domain cannot be empty");
    }
    if trimmed.contains(' ') {
        return fail("domain cannot contain spaces");
    }

    let name = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if name.is_empty() {
        return fail("domain cannot be empty");
    }
    if name.len() > 253 {
        return fail("domain too long (max 253 characters)");
    }
    if name.starts_with('.') {
        return fail("domain cannot start with a dot");
    }
    if name.contains("..") {
        return fail("domain cannot contain consecutive dots");
    }
    if !name.contains('.') {
        return fail("expected an apex domain such as example.com");
    }

    for label in name.split('.') {
        if label.is_empty() {
            return fail("domain contains empty label");
        }
        if label.len() > 63 {
            return fail("domain label too long (max 63 characters)");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return fail("domain label cannot start or end with hyphen");
        }
        for ch in label.chars() {
            if !ch.is_alphanumeric() && ch != '-' && ch != '_' {
                return fail("domain contains invalid character");
            }
        }
    }

    Ok(())
}
