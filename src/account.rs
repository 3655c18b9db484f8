use crate::{
    auth::{self, JwtKeys},
    email::Mailer,
    error::{AppError, AppResult},
    models::User,
    store::UserStore,
};
use axum::http::StatusCode;
use chrono::Utc;
use lettre::Address;
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MIN_PASSWORD_LEN: usize = 8;
pub const INVALID_RESET_TOKEN: &str = "Invalid or expired token";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug)]
pub struct LoginOutcome {
    pub user_id: i32,
    pub email: String,
    pub token: String,
}

/// Login and password reset over a single [`UserStore`].
pub struct AccountService {
    store: Arc<dyn UserStore>,
    keys: Arc<JwtKeys>,
    mailer: Option<Mailer>,
    base_url: String,
    reset_ttl: chrono::Duration,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        keys: Arc<JwtKeys>,
        mailer: Option<Mailer>,
        base_url: impl Into<String>,
        reset_ttl: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            keys,
            mailer,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            reset_ttl: chrono::Duration::from_std(reset_ttl)?,
        })
    }

    pub fn keys(&self) -> Arc<JwtKeys> {
        self.keys.clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::bad_request("Email and password are required"));
        }

        let Some(user) = self.store.find_by_email(&email).await? else {
            return Err(AppError::from(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS));
        };

        let matches = auth::verify_password(password, &user.password_hash).unwrap_or_else(|err| {
            warn!(user_id = user.id, %err, "stored password is not a supported hash");
            false
        });
        if !matches {
            return Err(AppError::from(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS));
        }

        info!(user_id = user.id, "admin logged in");
        Ok(LoginOutcome {
            user_id: user.id,
            token: self.keys.generate(user.id, SESSION_TTL)?,
            email: user.email,
        })
    }

    /// Issues a reset token when `email` belongs to an account. Unknown
    /// addresses succeed silently so callers cannot probe for accounts.
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::bad_request("Email is required"));
        }

        let Some(user) = self.store.find_by_email(&email).await? else {
            info!("password reset requested for unknown email");
            return Ok(());
        };

        let token = auth::generate_reset_token();
        let expires_at = Utc::now() + self.reset_ttl;
        self.store
            .store_reset_digest(user.id, &auth::digest_reset_token(&token), expires_at)
            .await?;

        let link = format!("{}/admin/reset-password?token={}", self.base_url, token);
        self.deliver_reset_link(&user, &link).await;
        Ok(())
    }

    /// Delivery failures are logged only. The caller answers the same way it
    /// does for an unknown address.
    async fn deliver_reset_link(&self, user: &User, link: &str) {
        let Some(mailer) = &self.mailer else {
            info!(user_id = user.id, %link, "smtp not configured, reset link not emailed");
            return;
        };

        let to = match user.email.parse::<Address>() {
            Ok(to) => to,
            Err(err) => {
                error!(user_id = user.id, %err, "stored email is not deliverable");
                return;
            }
        };
        let body = format!(
            r"Hi,

We received a request to reset the password of your club admin account. Open the link below within the next {} minutes to choose a new password:

{link}

If you did not request this, you can ignore this message and your password will stay the same.",
            self.reset_ttl.num_minutes(),
        );

        match mailer.send(to, "Password reset", body).await {
            Ok(_) => info!(user_id = user.id, "reset email sent"),
            Err(err) => error!(user_id = user.id, "failed to send reset email: {err:#}"),
        }
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        let token = token.trim();
        if token.is_empty() || new_password.is_empty() {
            return Err(AppError::bad_request("Token and new password are required"));
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::bad_request(
                "Password must be at least 8 characters long",
            ));
        }

        let digest = auth::digest_reset_token(token);
        let Some(user) = self.store.find_by_reset_digest(&digest).await? else {
            return Err(AppError::bad_request(INVALID_RESET_TOKEN));
        };

        match user.reset_token_exp {
            Some(exp) if exp > Utc::now() => {}
            _ => {
                info!(user_id = user.id, "rejected expired reset token");
                return Err(AppError::bad_request(INVALID_RESET_TOKEN));
            }
        }

        let password_hash = auth::hash_password(new_password)?;
        if !self
            .store
            .complete_reset(user.id, &digest, &password_hash)
            .await?
        {
            // consumed by a concurrent request
            return Err(AppError::bad_request(INVALID_RESET_TOKEN));
        }

        info!(user_id = user.id, "password reset");
        Ok(())
    }

    pub async fn session_user(&self, user_id: i32) -> AppResult<User> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::from(StatusCode::UNAUTHORIZED, "Session user no longer exists"))
    }
}
