//! Token sessions. Credentials live with the identity provider in front of
//! this service; here a login is find-or-create by username, answered with a
//! bearer token that the gated handlers resolve back to a user.

use axum::extract::{FromRequestParts, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::{Json, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// An authenticated caller. Extraction fails with a redirect to `/login`
/// when the bearer token is missing or stale.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// Identity when present, `None` otherwise. Used by views that only branch
/// on role instead of requiring a login.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<User>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::AuthRequired)?.to_string();
        let user = db::user_for_token(&state.pool, &token)
            .await?
            .ok_or(AppError::AuthRequired)?;
        Ok(AuthUser { user, token })
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match bearer_token(parts) {
            Some(token) => db::user_for_token(&state.pool, token).await?,
            None => None,
        };
        Ok(OptionalAuthUser(user))
    }
}

/// Target of the auth redirects. The real login UI lives with the identity
/// provider; this just tells an API caller what to do.
pub async fn login_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "detail": "POST a JSON body with a username to obtain a bearer token",
    }))
}

#[derive(Deserialize)]
pub struct LoginPayload {
    username: String,
}

#[derive(Serialize)]
pub enum LoginStatus {
    Exists,
    Created,
}

#[derive(Serialize)]
pub struct LoginResponse {
    status: LoginStatus,
    user: User,
    token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, AppError> {
    let name = payload.username.trim();
    if name.is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()));
    }

    let (status, user) = match db::find_user_by_name(&state.pool, name).await? {
        Some(user) => (LoginStatus::Exists, user),
        None => (LoginStatus::Created, db::create_user(&state.pool, name).await?),
    };
    let token = db::create_session(&state.pool, user.id).await?;
    Ok(Json(LoginResponse {
        status,
        user,
        token,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    db::delete_session(&state.pool, &auth.token).await?;
    Ok(Json(serde_json::json!({ "status": "LoggedOut" })))
}
