// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::{AppError, AuthErrorCode, ForbiddenCode};
use crate::models::{Role, User, UserResponse};
use crate::services::tokens::{extract_bearer_token, verify_access_token};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user, loaded fresh from the store for this request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: u64,
    /// Role as currently stored, which wins over the role in the token
    pub role: Role,
    pub profile: UserResponse,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            profile: user.into(),
        }
    }
}

impl AuthUser {
    /// Fail with 403 unless the user holds one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        tracing::warn!(
            user_id = self.id,
            role = self.role.as_str(),
            "Insufficient permissions"
        );
        Err(AppError::Forbidden(ForbiddenCode::InsufficientPermissions))
    }
}

/// Optional authentication result, present on routes that serve anonymous
/// and signed-in callers differently.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

/// Resolve a bearer header to an active user.
///
/// The account lookup after signature verification catches tokens that
/// outlive a deleted or deactivated account.
async fn authenticate(state: &AppState, auth_header: Option<&str>) -> Result<AuthUser, AppError> {
    let token = extract_bearer_token(auth_header)
        .ok_or(AppError::Unauthorized(AuthErrorCode::MissingToken))?;

    let claims = verify_access_token(token, &state.config.jwt_secret)
        .ok_or(AppError::Unauthorized(AuthErrorCode::InvalidToken))?;

    let user_id = claims
        .user_id()
        .ok_or(AppError::Unauthorized(AuthErrorCode::InvalidToken))?;

    let user = state
        .db
        .find_user_by_id(user_id)
        .await?
        .filter(|user| user.active)
        .ok_or_else(|| {
            tracing::warn!(user_id, "Valid token for missing or inactive user");
            AppError::Unauthorized(AuthErrorCode::UserNotFound)
        })?;

    Ok(AuthUser::from(user))
}

fn auth_header(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = auth_header(&request);
    let auth_user = authenticate(&state, header_value.as_deref()).await?;

    tracing::debug!(user_id = auth_user.id, "Request authenticated");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware that attaches the user when a valid token is present but
/// never rejects the request.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = auth_header(&request);
    let auth_user = match header_value {
        None => None,
        Some(value) => match authenticate(&state, Some(value.as_str())).await {
            Ok(user) => Some(user),
            Err(AppError::Unauthorized(code)) => {
                tracing::debug!(?code, "Ignoring invalid credentials on optional-auth route");
                None
            }
            Err(e) => return Err(e),
        },
    };

    request.extensions_mut().insert(MaybeAuthUser(auth_user));
    Ok(next.run(request).await)
}
