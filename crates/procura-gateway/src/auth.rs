//! JWT issuance and password hashing.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use procura_core::{PortalError, Result};
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_VENDOR: &str = "vendor";

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account ID
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// Generate a bearer token. Expiry is the only invalidation mechanism; there
/// is no revocation list.
pub fn create_token(
    user_id: &str,
    email: &str,
    role: &str,
    secret: &str,
    days: i64,
) -> Result<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(days))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.into(),
        email: email.into(),
        role: role.into(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| PortalError::storage(format!("Token creation failed: {e}")))
}

/// Validate and decode a bearer token.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| PortalError::unauthorized("Not authorized, token failed"))
}

/// Hash a password using bcrypt. Plaintext is never stored or logged.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, 12).map_err(|e| PortalError::storage(format!("Hash error: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
