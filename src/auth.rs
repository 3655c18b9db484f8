use crate::error::AppError;
use argon2::Argon2;
use axum::{
    async_trait,
    extract::{FromRequest, RequestParts, TypedHeader},
    headers::{authorization::Bearer, Authorization},
    http::StatusCode,
    Extension,
};
use jsonwebtoken::{
    errors::Result as JwtResult, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{fmt::Write, sync::Arc, time::Duration};

pub fn hash_password(password: impl AsRef<[u8]>) -> password_hash::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_ref(), &salt)
        .map(|h| h.to_string())
}

/// Fails only when `password_hash` is not a PHC string. A mismatch is `Ok(false)`.
pub fn verify_password(
    password: impl AsRef<[u8]>,
    password_hash: impl AsRef<str>,
) -> password_hash::Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash.as_ref())?;
    Ok(Argon2::default()
        .verify_password(password.as_ref(), &parsed_hash)
        .is_ok())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// 32 bytes from the OS random source, as 64 lowercase hex characters.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// What gets persisted for a reset token. The raw token only ever leaves in the reset link.
pub fn digest_reset_token(token: &str) -> String {
    to_hex(&Sha256::digest(token.as_bytes()))
}

pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_base64_secret(secret: &str) -> JwtResult<Self> {
        Ok(Self {
            encoding: EncodingKey::from_base64_secret(secret)?,
            decoding: DecodingKey::from_base64_secret(secret)?,
        })
    }

    pub fn generate(&self, user_id: i32, exp: Duration) -> JwtResult<String> {
        jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                sub: user_id,
                exp: jsonwebtoken::get_current_timestamp() + exp.as_secs(),
            },
            &self.encoding,
        )
    }

    pub fn validate(&self, token: &str) -> JwtResult<TokenData<Claims>> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub exp: u64,
}

/// A request carrying a valid admin session token.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
    pub user_id: i32,
}

#[async_trait]
impl<B: Send> FromRequest<B> for AdminSession {
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request(req)
                .await
                .map_err(|_| AppError::from(StatusCode::UNAUTHORIZED, "Missing session token"))?;
        let Extension(keys) = Extension::<Arc<JwtKeys>>::from_request(req)
            .await
            .map_err(|e| anyhow::anyhow!("jwt keys are not installed: {e}"))?;

        let data = keys.validate(bearer.token()).map_err(|err| {
            tracing::debug!(%err, "rejected session token");
            AppError::from(StatusCode::UNAUTHORIZED, "Invalid or expired session")
        })?;

        Ok(AdminSession {
            user_id: data.claims.sub,
        })
    }
}
