// Stateless HS256 tokens: nothing about issued tokens is kept server-side,
// so there is no revocation and every token lives exactly TOKEN_LIFETIME_SECS.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Lifetime of every issued token, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `username`, valid for one hour from now.
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        self.issue_at(username, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        if username.is_empty() {
            return Err(AppError::Validation(
                "username required in JSON body".to_string(),
            ));
        }

        let claims = Claims {
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to encode session token")?;
        Ok(token)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {e}");
                AppError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}
