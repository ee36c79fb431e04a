//! JWT token generation and verification.
//!
//! Tokens are HS256 JWTs carrying the user id and username. Expiry is checked
//! against an injectable [`Clock`] rather than inside `jsonwebtoken`, so the
//! library only validates structure, algorithm and signature.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::clock::{Clock, SystemClock};

/// The only algorithm tokens are signed with and accepted under.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
}

/// Claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub id: i64,
    pub username: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Not before (unix timestamp).
    pub nbf: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// HMAC signing secret. Never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Sign a token for `identity` valid from `now` until `now + ttl`.
pub fn sign_at(
    identity: &Identity,
    secret: &[u8],
    ttl: Duration,
    now: i64,
) -> Result<String, AuthError> {
    let claims = Claims {
        id: identity.id,
        username: identity.username.clone(),
        iat: now,
        nbf: now,
        exp: now.saturating_add(ttl.num_seconds()),
    };
    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Signing(format!("jwt encode: {e}")))
}

/// Verify `token` as of `now`, returning its claims.
///
/// Fails with [`AuthError::TokenInvalid`] on a bad signature, a header
/// algorithm other than HS256, malformed claims or a future `nbf`, and with
/// [`AuthError::TokenExpired`] once `now` is past `exp`.
pub fn verify_at(token: &str, secret: &[u8], now: i64) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;

    if claims.nbf > now {
        return Err(AuthError::TokenInvalid);
    }
    if now > claims.exp {
        return Err(AuthError::TokenExpired);
    }
    Ok(claims)
}

/// Sign a token using the wall clock.
pub fn sign(identity: &Identity, secret: &[u8], ttl: Duration) -> Result<String, AuthError> {
    sign_at(identity, secret, ttl, SystemClock.now())
}

/// Verify a token using the wall clock.
pub fn verify(token: &str, secret: &[u8]) -> Result<Claims, AuthError> {
    verify_at(token, secret, SystemClock.now())
}

/// Issues and verifies tokens with a fixed secret, lifetime and clock.
#[derive(Clone, Debug)]
pub struct TokenService {
    secret: SigningSecret,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: SigningSecret, ttl: Duration) -> Self {
        Self {
            secret,
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Lifetime given to newly signed tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn sign(&self, identity: &Identity) -> Result<String, AuthError> {
        sign_at(identity, self.secret.as_bytes(), self.ttl, self.clock.now())
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        verify_at(token, self.secret.as_bytes(), self.clock.now())
    }
}
