use super::MessageResponse;
use crate::{
    account::AccountService,
    auth::AdminSession,
    error::AppResult,
};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserSummary {
    id: i32,
    email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    message: &'static str,
    user_id: i32,
    user: UserSummary,
    token: String,
}

#[derive(Deserialize)]
struct ForgotRequest {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetRequest {
    #[serde(default)]
    token: String,
    #[serde(default)]
    new_password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    user_id: i32,
    email: String,
}

async fn login(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let outcome = accounts.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        user_id: outcome.user_id,
        user: UserSummary {
            id: outcome.user_id,
            email: outcome.email,
        },
        token: outcome.token,
    }))
}

async fn forgot_password(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(req): Json<ForgotRequest>,
) -> AppResult<Json<MessageResponse>> {
    accounts.request_reset(&req.email).await?;

    Ok(Json(MessageResponse::new(
        "If an account with that email exists, a password reset link has been sent",
    )))
}

async fn reset_password(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(req): Json<ResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    accounts.reset_password(&req.token, &req.new_password).await?;

    Ok(Json(MessageResponse::new("Password has been reset successfully")))
}

async fn session(
    Extension(accounts): Extension<Arc<AccountService>>,
    AdminSession { user_id }: AdminSession,
) -> AppResult<Json<SessionResponse>> {
    let user = accounts.session_user(user_id).await?;

    Ok(Json(SessionResponse {
        user_id: user.id,
        email: user.email,
    }))
}

// the unprefixed paths are older aliases still used by the site's forms
pub fn app() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/login", post(login))
        .route("/auth/forgot", post(forgot_password))
        .route("/forgot-password", post(forgot_password))
        .route("/auth/reset", post(reset_password))
        .route("/reset-password", post(reset_password))
        .route("/auth/session", get(session))
}
