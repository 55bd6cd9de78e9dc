//! Middleware for bearer token validation

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use crate::{
    error::{AuthError, AuthResult},
    jwt::{Claims, JwtService},
    models::Role,
};

/// Identity of the caller, taken from verified token claims.
///
/// The user row is not re-read, so a token stays valid for its whole
/// lifetime even if the account changes underneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
            username: claims.username,
        }
    }
}

/// Resolve the caller from the `Authorization: Bearer` header.
///
/// A missing header (or one that is not a bearer credential) is
/// [`AuthError::Unauthenticated`]; a token that fails verification is
/// [`AuthError::Forbidden`].
pub fn authenticate_headers(
    jwt_service: &JwtService,
    headers: &HeaderMap,
) -> AuthResult<AuthUser> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AuthError::Unauthenticated)?;

    let claims = jwt_service.verify(bearer.token())?;
    debug!("Authenticated user {} ({})", claims.username, claims.id);

    Ok(claims.into())
}

/// Reject requests without a valid bearer token and attach [`AuthUser`]
/// to the request extensions for downstream handlers.
pub async fn require_auth(
    State(jwt_service): State<JwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate_headers(&jwt_service, req.headers())?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
