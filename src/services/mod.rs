// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - authentication and admission logic.

pub mod password;
pub mod rate_limit;
pub mod tokens;

pub use password::{hash_password, verify_password};
pub use rate_limit::{Admission, AdmissionLimiter, RateWindow};
pub use tokens::{
    extract_bearer_token, generate_access_token, generate_refresh_token, verify_access_token,
    verify_refresh_token, AccessClaims, TokenIdentity, TokenType,
};
