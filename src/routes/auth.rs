// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, login, token refresh and profile.

use crate::error::{AppError, AuthErrorCode, ForbiddenCode, Result};
use crate::middleware::auth::{require_auth, AuthUser};
use crate::models::{ApiResponse, Role, User, UserResponse};
use crate::routes::extract::ValidJson;
use crate::services::password::{hash_password, verify_password};
use crate::services::tokens::{
    generate_access_token, generate_refresh_token, verify_refresh_token, TokenIdentity,
};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh))
        .route(
            "/api/v1/auth/me",
            get(me).route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        )
}

/// Passwords need at least one lowercase letter, one uppercase letter and one digit.
fn validate_password_strength(password: &str) -> std::result::Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(
            "must contain at least one uppercase letter, one lowercase letter and one digit".into(),
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: String,
    #[serde(rename = "senha")]
    #[validate(
        length(min = 8, message = "must be at least 8 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[serde(rename = "senha")]
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
}

/// User profile plus a fresh token pair.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserResponse,
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign an access/refresh pair for `user`.
fn issue_tokens(config: &crate::config::Config, user: User) -> Result<AuthPayload> {
    let token = generate_access_token(
        &TokenIdentity::from(&user),
        &config.jwt_secret,
        config.access_token_ttl_secs,
    )?;
    let refresh_token =
        generate_refresh_token(user.id, &config.jwt_secret, config.refresh_token_ttl_secs)?;

    Ok(AuthPayload {
        user: user.into(),
        token,
        refresh_token,
    })
}

async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>)> {
    let email = normalize_email(&body.email);

    // Uniqueness is check-then-insert; the store has no unique index.
    if state.db.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let now = now_rfc3339();
    let password_digest = hash_password(&body.password, &state.config.password_salt);
    let user = state
        .db
        .insert(|id| User {
            id,
            name: body.name.trim().to_string(),
            email,
            password_digest,
            role: body.role,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        })
        .await?;

    tracing::info!(user_id = user.id, role = user.role.as_str(), "User registered");

    let payload = issue_tokens(&state.config, user)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("User created", payload)),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>> {
    let email = normalize_email(&body.email);
    let invalid = || AppError::Unauthorized(AuthErrorCode::InvalidCredentials);

    let user = state.db.find_user_by_email(&email).await?.ok_or_else(|| {
        tracing::debug!("Login for unknown email");
        invalid()
    })?;

    if !verify_password(
        &body.password,
        &state.config.password_salt,
        &user.password_digest,
    ) {
        tracing::info!(user_id = user.id, "Login with wrong password");
        return Err(invalid());
    }

    if !user.active {
        tracing::info!(user_id = user.id, "Login for inactive user");
        return Err(AppError::Forbidden(ForbiddenCode::UserInactive));
    }

    tracing::info!(user_id = user.id, "User logged in");
    let payload = issue_tokens(&state.config, user)?;
    Ok(Json(ApiResponse::with_message("Login successful", payload)))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>> {
    let user_id = verify_refresh_token(&body.refresh_token, &state.config.jwt_secret)
        .ok_or(AppError::Unauthorized(AuthErrorCode::InvalidToken))?;

    let user = state
        .db
        .find_user_by_id(user_id)
        .await?
        .filter(|user| user.active)
        .ok_or(AppError::Unauthorized(AuthErrorCode::UserNotFound))?;

    tracing::debug!(user_id, "Tokens refreshed");
    let payload = issue_tokens(&state.config, user)?;
    Ok(Json(ApiResponse::new(payload)))
}

async fn me(Extension(user): Extension<AuthUser>) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::new(user.profile))
}
