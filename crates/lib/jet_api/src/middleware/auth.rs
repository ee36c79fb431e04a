//! Authentication middleware: route allow-listing, Bearer token extraction
//! and JWT verification.
//!
//! Each request either passes (allow-listed, or carrying a valid token) or is
//! rejected with 403 before any handler runs.

use std::collections::HashSet;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use jet_core::auth::AuthError;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Optional scheme prefix stripped from the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

/// Final path segments reachable without a token.
#[derive(Debug, Clone, Default)]
pub struct AllowList(HashSet<String>);

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// `login`, `register` and `health`.
    pub fn defaults() -> Self {
        Self::new().allow("login").allow("register").allow("health")
    }

    pub fn allow(mut self, segment: impl Into<String>) -> Self {
        self.0.insert(segment.into());
        self
    }

    /// Exact match of the last `/`-separated segment of `path`.
    pub fn permits(&self, path: &str) -> bool {
        path.rsplit('/')
            .next()
            .is_some_and(|segment| self.0.contains(segment))
    }
}

/// Identity of the caller, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    /// The raw token the request was authenticated with.
    pub token: String,
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::TokenMissing)
    }
}

/// Pull the token out of an `Authorization` header value.
fn bearer_token(header: &str) -> &str {
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header)
}

/// Axum middleware: lets allow-listed paths through untouched; otherwise
/// verifies `Authorization: Bearer <token>` and injects [`CurrentUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.allow_list.permits(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let header = match request.headers().get(AUTHORIZATION) {
        None => return Err(AuthError::TokenMissing.into()),
        Some(value) if value.is_empty() => return Err(AuthError::TokenMissing.into()),
        Some(value) => value.to_str().map_err(|_| AppError::TokenInvalid)?,
    };

    let token = bearer_token(header);
    let claims = state.tokens.verify(token)?;
    debug!(user_id = claims.id, username = %claims.username, "request authenticated");

    let user = CurrentUser {
        id: claims.id,
        username: claims.username,
        token: token.to_string(),
    };
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_matches_final_segment_only() {
        let allow = AllowList::defaults();
        assert!(allow.permits("/api/v1/login"));
        assert!(allow.permits("/health"));
        assert!(allow.permits("/anything/register"));
        assert!(!allow.permits("/api/v1/login/extra"));
        assert!(!allow.permits("/api/v1/users"));
        assert!(!allow.permits("/api/v1/login/"));
        assert!(!allow.permits("/api/v1/logins"));
        assert!(!allow.permits("/"));
    }

    #[test]
    fn empty_allow_list_permits_nothing() {
        assert!(!AllowList::new().permits("/health"));
    }

    #[test]
    fn bearer_prefix_is_optional() {
        assert_eq!("abc.def.ghi", bearer_token("Bearer abc.def.ghi"));
        assert_eq!("abc.def.ghi", bearer_token("abc.def.ghi"));
        assert_eq!("", bearer_token("Bearer "));
    }
}
