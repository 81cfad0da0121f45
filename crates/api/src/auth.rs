//! Admin bearer token verification.
//!
//! Tokens are HS256 JWTs signed with the shared secret. Only the `role`
//! claim is consulted; `exp` is enforced when present.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracker_core::{AuthErrorCode, Error, Result};

pub const ADMIN_ROLE: &str = "admin";

const MISSING_TOKEN: &str = "Authorization denied, no token provided";
const INVALID_TOKEN: &str = "Invalid token";
const NOT_ADMIN: &str = "Access denied. Admin privileges required.";

/// Claims read from a verified token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// Verifies admin tokens against the shared secret.
#[derive(Clone)]
pub struct AdminAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl AdminAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();

        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens without `exp` never expire.
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Check an `Authorization` header value and require the admin role.
    pub fn authorize_admin(&self, authorization: Option<&str>) -> Result<Claims> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or_else(|| Error::auth(AuthErrorCode::MissingToken, MISSING_TOKEN))?;

        let claims = self.verify(token).map_err(|e| {
            debug!(error = %e, "Admin token rejected");
            Error::auth(AuthErrorCode::InvalidToken, INVALID_TOKEN)
        })?;

        if !claims.is_admin() {
            return Err(Error::auth(AuthErrorCode::NotAdmin, NOT_ADMIN));
        }

        Ok(claims)
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::auth(AuthErrorCode::InvalidToken, e.to_string()))
    }

    /// Issue an HS256 token for `claims`.
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| Error::internal(format!("Failed to sign token: {e}")))
    }
}

/// Token from a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
