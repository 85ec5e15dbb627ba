// src/services/totp.rs
// DOCUMENTATION: Time-based one-time passwords (RFC 6238, HMAC-SHA1)
// PURPOSE: Second factor checked by POST /auth/2fa, compatible with
// authenticator apps (base32 secret, otpauth:// enrolment URI)

use crate::errors::CrmError;
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// Seconds per time step
pub const STEP_SECONDS: u64 = 30;

/// Code length
pub const DIGITS: u32 = 6;

/// Issuer shown by authenticator apps
pub const ISSUER: &str = "CRM";

/// Accepted clock drift, in steps on each side
const DRIFT_STEPS: u64 = 1;

/// New random 160-bit secret, base32 encoded without padding
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE32_NOPAD.encode(&bytes)
}

/// Code valid for the step containing `unix_time`
pub fn code_at(secret: &str, unix_time: u64) -> Result<String, CrmError> {
    let key = decode_secret(secret)?;
    hotp(&key, unix_time / STEP_SECONDS)
}

/// Check a submitted code against the current step and its neighbours
pub fn verify(secret: &str, code: &str, unix_time: u64) -> Result<bool, CrmError> {
    let code = code.trim();
    if code.len() != DIGITS as usize || !code.chars().all(|c| c.is_ascii_digit()) {
        return Ok(false);
    }

    let key = decode_secret(secret)?;
    let current = unix_time / STEP_SECONDS;
    let first = current.saturating_sub(DRIFT_STEPS);

    for counter in first..=current.saturating_add(DRIFT_STEPS) {
        if hotp(&key, counter)? == code {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Key URI understood by authenticator apps
/// Format: otpauth://totp/ISSUER:account?secret=...&issuer=ISSUER&...
pub fn provisioning_uri(secret: &str, account: &str) -> Result<String, CrmError> {
    let mut url = Url::parse("otpauth://totp/")
        .map_err(|e| CrmError::InternalError(format!("otpauth url: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| CrmError::InternalError("otpauth url cannot take a path".to_string()))?
        .pop_if_empty()
        .push(&format!("{}:{}", ISSUER, account));

    url.query_pairs_mut()
        .append_pair("secret", secret)
        .append_pair("issuer", ISSUER)
        .append_pair("algorithm", "SHA1")
        .append_pair("digits", &DIGITS.to_string())
        .append_pair("period", &STEP_SECONDS.to_string());

    Ok(url.to_string())
}

/// Base32 secret to raw key bytes; apps show secrets in groups, so spaces
/// and lowercase are tolerated
fn decode_secret(secret: &str) -> Result<Vec<u8>, CrmError> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|e| CrmError::InternalError(format!("invalid TOTP secret: {}", e)))
}

/// RFC 4226 HOTP with dynamic truncation
fn hotp(key: &[u8], counter: u64) -> Result<String, CrmError> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| CrmError::InternalError(format!("HMAC error: {}", e)))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = ((digest[offset] as u32 & 0x7f) << 24)
        | ((digest[offset + 1] as u32) << 16)
        | ((digest[offset + 2] as u32) << 8)
        | (digest[offset + 3] as u32);

    Ok(format!(
        "{:0width$}",
        binary % 10u32.pow(DIGITS),
        width = DIGITS as usize
    ))
}
