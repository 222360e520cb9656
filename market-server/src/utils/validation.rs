//! Input validation helpers
//!
//! Text length limits and format checks used by the managers before
//! anything is written.

use crate::error::{MarketError, MarketResult};

// ── Text length limits ──────────────────────────────────────────────

/// Group name bounds
pub const MIN_GROUP_NAME_LEN: usize = 3;
pub const MAX_GROUP_NAME_LEN: usize = 100;

/// Location bounds (groups, surplus listings)
pub const MIN_LOCATION_LEN: usize = 2;
pub const MAX_LOCATION_LEN: usize = 100;

/// Entity names: items, listings, people, businesses
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, rules
pub const MAX_NOTE_LEN: usize = 500;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Group size bounds
pub const MIN_GROUP_MEMBERS: u32 = 2;
pub const MAX_GROUP_MEMBERS: u32 = 50;

// ── Text ────────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> MarketResult<()> {
    validate_text_length(value, field, 1, max_len)
}

/// Validate a required string against both bounds (counted in characters).
pub fn validate_text_length(
    value: &str,
    field: &str,
    min_len: usize,
    max_len: usize,
) -> MarketResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MarketError::validation(format!("{field} must not be empty")));
    }
    let len = trimmed.chars().count();
    if len < min_len {
        return Err(MarketError::validation(format!(
            "{field} is too short ({len} chars, min {min_len})"
        )));
    }
    if len > max_len {
        return Err(MarketError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> MarketResult<()> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(MarketError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

// ── Formats ─────────────────────────────────────────────────────────

/// E.164: `+`, then 2-15 digits, the first not `0`
pub fn is_valid_phone(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    (2..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0')
}

pub fn validate_phone(phone: &str) -> MarketResult<()> {
    if !is_valid_phone(phone) {
        return Err(MarketError::validation(format!(
            "phone must be in E.164 format (e.g. +919876543210), got {phone:?}"
        )));
    }
    Ok(())
}

/// Loose shape check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

pub fn validate_optional_email(email: &Option<String>) -> MarketResult<()> {
    if let Some(e) = email
        && !e.is_empty()
        && !is_valid_email(e)
    {
        return Err(MarketError::validation(format!("invalid email address: {e:?}")));
    }
    Ok(())
}

/// Indian GSTIN: 15 upper-case alphanumerics
pub fn validate_optional_gst(gst: &Option<String>) -> MarketResult<()> {
    if let Some(g) = gst
        && !g.is_empty()
        && !(g.len() == 15
            && g.bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()))
    {
        return Err(MarketError::validation(format!("invalid GST number: {g:?}")));
    }
    Ok(())
}
