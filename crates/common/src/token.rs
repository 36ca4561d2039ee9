use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("password hash failure")]
    Hash,

    #[error("invalid or expired token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("malformed subject claim")]
    Subject,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn hash_password(password: &str) -> Result<String, TokenError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| TokenError::Hash)
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    role: &str,
    validity_minutes: i64,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: (now + Duration::minutes(validity_minutes)).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> Result<(Uuid, JwtClaims), TokenError> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Subject)?;
    Ok((user_id, data.claims))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2").expect("Failed to hash password");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn token_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("secret", user_id, "admin", 5).expect("Failed to issue token");

        let (decoded_id, claims) = verify_token("secret", &token).expect("Failed to verify token");
        assert_eq!(decoded_id, user_id);
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", Uuid::new_v4(), "customer", 5).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("secret", Uuid::new_v4(), "customer", -10).unwrap();
        assert!(verify_token("secret", &token).is_err());
    }
}
