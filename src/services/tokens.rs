// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access and refresh tokens.
//!
//! Both kinds are HS256 JWTs signed with the same secret and told apart by
//! the `type` claim. Verification never errors: anything that isn't a valid,
//! unexpired token of the expected kind comes back as `None`.
//!
//! Every operation has an `_at` variant taking the current Unix time so
//! expiry can be exercised deterministically.

use crate::models::{Role, User};
use crate::time_utils::now_unix_secs;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Discriminator stored in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Identity embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    /// User ID as a string
    pub sub: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for TokenIdentity {
    fn from(user: &User) -> Self {
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Access token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl AccessClaims {
    /// Numeric user ID from `sub`, if it parses.
    pub fn user_id(&self) -> Option<u64> {
        self.sub.parse().ok()
    }
}

/// Refresh token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iat: u64,
    pub exp: u64,
}

fn sign<T: Serialize>(claims: &T, secret: &[u8]) -> anyhow::Result<String> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )?)
}

/// Check signature and `now < exp`.
fn verify<T: DeserializeOwned>(
    token: &str,
    secret: &[u8],
    now: u64,
    exp: impl Fn(&T) -> u64,
) -> Option<T> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is compared against the caller's clock below, with no leeway.
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = match decode::<T>(token, &key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!(error = %e, "Token rejected");
            return None;
        }
    };

    if now >= exp(&claims) {
        tracing::debug!("Token expired");
        return None;
    }
    Some(claims)
}

/// Issue an access token valid for `ttl_secs` from now.
pub fn generate_access_token(
    identity: &TokenIdentity,
    secret: &[u8],
    ttl_secs: u64,
) -> anyhow::Result<String> {
    generate_access_token_at(identity, secret, ttl_secs, now_unix_secs())
}

pub fn generate_access_token_at(
    identity: &TokenIdentity,
    secret: &[u8],
    ttl_secs: u64,
    now: u64,
) -> anyhow::Result<String> {
    let claims = AccessClaims {
        sub: identity.sub.clone(),
        email: identity.email.clone(),
        role: identity.role,
        token_type: TokenType::Access,
        iat: now,
        exp: now.saturating_add(ttl_secs),
    };
    sign(&claims, secret)
}

/// Verify an access token. Refresh tokens are rejected.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Option<AccessClaims> {
    verify_access_token_at(token, secret, now_unix_secs())
}

pub fn verify_access_token_at(token: &str, secret: &[u8], now: u64) -> Option<AccessClaims> {
    verify::<AccessClaims>(token, secret, now, |c| c.exp)
        .filter(|claims| claims.token_type == TokenType::Access)
}

/// Issue a refresh token for a user, valid for `ttl_secs` from now.
pub fn generate_refresh_token(
    user_id: u64,
    secret: &[u8],
    ttl_secs: u64,
) -> anyhow::Result<String> {
    generate_refresh_token_at(user_id, secret, ttl_secs, now_unix_secs())
}

pub fn generate_refresh_token_at(
    user_id: u64,
    secret: &[u8],
    ttl_secs: u64,
    now: u64,
) -> anyhow::Result<String> {
    let claims = RefreshClaims {
        sub: user_id.to_string(),
        token_type: TokenType::Refresh,
        iat: now,
        exp: now.saturating_add(ttl_secs),
    };
    sign(&claims, secret)
}

/// Verify a refresh token and return the user ID it was issued for.
pub fn verify_refresh_token(token: &str, secret: &[u8]) -> Option<u64> {
    verify_refresh_token_at(token, secret, now_unix_secs())
}

pub fn verify_refresh_token_at(token: &str, secret: &[u8], now: u64) -> Option<u64> {
    verify::<RefreshClaims>(token, secret, now, |c| c.exp)
        .filter(|claims| claims.token_type == TokenType::Refresh)
        .and_then(|claims| claims.sub.parse().ok())
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}
