// src/services/credentials.rs
// DOCUMENTATION: Password hashing, token and recovery code generation

use crate::errors::CrmError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of recovery codes handed out when 2FA is enabled
pub const RECOVERY_CODE_COUNT: usize = 8;

/// Hash a password into an Argon2 PHC string
pub fn hash_password(password: &str) -> Result<String, CrmError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CrmError::InternalError(format!("password hashing failed: {}", e)))
}

/// Check a password against a stored hash, a malformed hash never matches
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

/// Hex SHA-256 digest, used for session tokens and recovery codes at rest
pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// 256-bit random bearer token
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Recovery codes in the form `xxxxx-xxxxx`
pub fn generate_recovery_codes(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let mut bytes = [0u8; 5];
            rng.fill_bytes(&mut bytes);
            let raw = hex::encode(bytes);
            format!("{}-{}", &raw[..5], &raw[5..])
        })
        .collect()
}

/// Digest of a recovery code as typed by the user
pub fn recovery_code_hash(code: &str) -> String {
    sha256_hex(&code.trim().to_lowercase())
}
