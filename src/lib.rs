// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend API for the accounting firm's website.
//!
//! Provides user accounts with JWT authentication, the public catalogue of
//! offerings, contact-form submissions, testimonials and internal tasks.
//! Public write endpoints are guarded by a per-client admission limiter.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::AdmissionLimiter;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    /// Rate windows for public write endpoints, scoped to this process
    pub limiter: AdmissionLimiter,
}

impl AppState {
    pub fn new(config: Config, db: Db) -> Self {
        Self {
            config,
            db,
            limiter: AdmissionLimiter::new(),
        }
    }
}
