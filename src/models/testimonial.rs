// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Customer testimonial shown on the public site.

use serde::{Deserialize, Serialize};

/// Testimonial stored in the `testimonials` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: u64,
    pub name: String,
    pub company: Option<String>,
    pub message: String,
    /// 1 to 5 stars
    pub rating: u8,
    /// Photo URL
    pub photo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Trim a message and collapse internal whitespace runs to single spaces.
pub fn sanitize_message(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
