// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Machine-readable reason attached to 401 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorCode {
    MissingToken,
    InvalidToken,
    UserNotFound,
    InvalidCredentials,
}

impl AuthErrorCode {
    fn message(self) -> &'static str {
        match self {
            AuthErrorCode::MissingToken => "Access token not provided",
            AuthErrorCode::InvalidToken => "Invalid or expired token",
            AuthErrorCode::UserNotFound => "User not found or inactive",
            AuthErrorCode::InvalidCredentials => "Invalid credentials",
        }
    }
}

/// Machine-readable reason attached to 403 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForbiddenCode {
    InsufficientPermissions,
    UserInactive,
}

impl ForbiddenCode {
    fn message(self) -> &'static str {
        match self {
            ForbiddenCode::InsufficientPermissions => "Access denied. Insufficient permissions.",
            ForbiddenCode::UserInactive => "User is inactive. Contact the administrator.",
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request data")]
    Validation(Vec<String>),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Authentication failed: {0:?}")]
    Unauthorized(AuthErrorCode),

    #[error("Forbidden: {0:?}")]
    Forbidden(ForbiddenCode),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    RateLimited {
        /// Seconds until the current window resets.
        retry_after_secs: u64,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid value ({})", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}

/// Single entry of the `errors` array used by 429/500 bodies.
#[derive(Serialize)]
struct ErrorEntry {
    code: u16,
    message: String,
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            code: None,
            errors: None,
        }
    }

    fn entries(code: u16, message: &str) -> Self {
        let errors = vec![ErrorEntry {
            code,
            message: message.to_string(),
        }];
        Self {
            success: false,
            message: None,
            code: None,
            errors: serde_json::to_value(errors).ok(),
        }
    }
}

/// Generic code the public API has always used for unexpected failures.
const INTERNAL_ERROR_CODE: u16 = 7000;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    errors: serde_json::to_value(errors).ok(),
                    ..ErrorResponse::message("Invalid request data")
                },
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::message(msg)),
            AppError::Unauthorized(code) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    code: serde_json::to_value(code).ok(),
                    ..ErrorResponse::message(code.message())
                },
            ),
            AppError::Forbidden(code) => (
                StatusCode::FORBIDDEN,
                ErrorResponse {
                    code: serde_json::to_value(code).ok(),
                    ..ErrorResponse::message(code.message())
                },
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::message(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::message(msg)),
            AppError::RateLimited { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse::entries(
                        StatusCode::TOO_MANY_REQUESTS.as_u16(),
                        "Too many attempts. Try again in a few minutes.",
                    )),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
                return response;
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::entries(INTERNAL_ERROR_CODE, "Internal Server Error"),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::entries(INTERNAL_ERROR_CODE, "Internal Server Error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
