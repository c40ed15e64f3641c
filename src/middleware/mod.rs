// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, admission limiting).

pub mod auth;
pub mod rate_limit;

pub use auth::{optional_auth, require_auth, AuthUser, MaybeAuthUser};
pub use rate_limit::limit_public_writes;
