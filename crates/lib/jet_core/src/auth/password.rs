//! Password hashing via bcrypt.

use tracing::warn;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10). The salt is generated per call
/// and embedded in the returned hash.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::Hashing(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// A hash that bcrypt cannot parse never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            warn!(error = %e, "stored password hash is not a valid bcrypt hash");
            false
        }
    }
}
