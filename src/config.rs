// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

/// Default access token lifetime (24 hours).
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
/// Default refresh token lifetime (30 days).
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;
/// Default admission policy for public write endpoints: 5 requests per minute.
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60_000;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Cloud Firestore (or its emulator).
    Firestore,
    /// In-process store; contents are lost on restart.
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Production frontend origin allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    pub storage_backend: StorageBackend,

    /// HMAC secret for access and refresh tokens (raw bytes)
    pub jwt_secret: Vec<u8>,
    /// Application-wide salt mixed into password digests
    pub password_salt: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,

    /// Admissions allowed per window on public write endpoints
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8787,
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            storage_backend: StorageBackend::Memory,
            jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
            password_salt: "test_salt".to_string(),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            rate_limit_window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
        }
    }
}

impl Config {
    /// Config used by unit and integration tests.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development. Only `JWT_SECRET` is
    /// mandatory; everything else falls back to a development default.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_secret = env::var("JWT_SECRET")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET", String::new()));
        }

        Ok(Self {
            port: parse_or("PORT", 8787)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            storage_backend: match env::var("STORAGE_BACKEND") {
                Ok(v) => v.parse()?,
                Err(_) => StorageBackend::Firestore,
            },
            jwt_secret: jwt_secret.into_bytes(),
            password_salt: env::var("PASSWORD_SALT").unwrap_or_else(|_| "default_salt".to_string()),
            access_token_ttl_secs: parse_or(
                "ACCESS_TOKEN_TTL_SECS",
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?,
            refresh_token_ttl_secs: parse_or(
                "REFRESH_TOKEN_TTL_SECS",
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?,
            rate_limit_max_requests: parse_or(
                "RATE_LIMIT_MAX_REQUESTS",
                DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            )?,
            rate_limit_window_ms: parse_or("RATE_LIMIT_WINDOW_MS", DEFAULT_RATE_LIMIT_WINDOW_MS)?,
        })
    }
}

/// Read an optional numeric variable, rejecting values that don't parse.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
