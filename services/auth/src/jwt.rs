//! JWT service for token generation and validation
//!
//! Tokens are HS256-signed with a single process-wide secret and expire one
//! hour after issuance. Verification is stateless: there is no revocation
//! list and no refresh flow, expiry is the only way a token stops working.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::{
    error::{AuthError, AuthResult},
    models::{Role, User},
};

/// Signing secret used when `SESSION_SECRET` is not set.
///
/// Anyone who knows this value can mint tokens. It exists so a fresh checkout
/// runs without setup and must be overridden in any real deployment.
pub const DEFAULT_SECRET: &str = "supersecretkey";

/// Default token lifetime in seconds
pub const DEFAULT_TOKEN_EXPIRY: u64 = 3600;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret
    pub secret: String,
    /// Token lifetime in seconds (default: 1 hour)
    pub token_expiry: u64,
    /// True when the compiled-in secret is in use
    pub uses_default_secret: bool,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("token_expiry", &self.token_expiry)
            .field("uses_default_secret", &self.uses_default_secret)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_SECRET`: HMAC signing secret (default: insecure built-in value)
    /// - `JWT_TOKEN_EXPIRY`: Token expiry in seconds (default: 3600)
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let token_expiry = std::env::var("JWT_TOKEN_EXPIRY")
            .unwrap_or_else(|_| DEFAULT_TOKEN_EXPIRY.to_string())
            .parse()
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        match secret {
            Some(secret) => Self::with_secret(secret, token_expiry),
            None => {
                warn!("SESSION_SECRET is not set, signing tokens with the built-in default secret");
                JwtConfig {
                    secret: DEFAULT_SECRET.to_string(),
                    token_expiry,
                    uses_default_secret: true,
                }
            }
        }
    }

    pub fn with_secret(secret: impl Into<String>, token_expiry: u64) -> Self {
        JwtConfig {
            secret: secret.into(),
            token_expiry,
            uses_default_secret: false,
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID
    pub id: i64,
    /// User role
    pub role: Role,
    /// User handle at issuance
    pub username: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue a token for a user, valid from now
    pub fn issue(&self, user: &User) -> AuthResult<String> {
        self.issue_at(user, unix_now()?)
    }

    /// Issue a token for a user as if it were issued at `issued_at`
    pub fn issue_at(&self, user: &User, issued_at: u64) -> AuthResult<String> {
        let claims = Claims {
            id: user.id,
            role: user.role,
            username: user.username.clone(),
            iat: issued_at,
            exp: issued_at + self.config.token_expiry,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Crypto(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token and return the claims
    ///
    /// A bad signature, a malformed token and an expired token all fail with
    /// [`AuthError::Forbidden`]. The user row is not consulted.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                AuthError::Forbidden
            })
    }

    /// Get the token expiry time
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }
}

fn unix_now() -> AuthResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AuthError::Crypto(format!("Failed to get current time: {}", e)))
}
